pub mod keyboard;
pub mod tracker;

pub use keyboard::{keyboard_target, KeyDirection};
pub use tracker::GestureTracker;

use crate::commit::PendingMove;
use crate::types::{Board, ColumnId, ItemId};

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Item,
    Column,
}

/// Gesture state. Only `Idle` accepts a new drag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingItem(ItemId),
    DraggingColumn(ColumnId),
}

/// How a finished drag is turned into a stable arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovePolicy {
    /// No backing authority: cross-column moves preview live during the drag,
    /// same-column reorders and column moves apply at drop.
    #[default]
    LocalOnly,
    /// Cross-column moves are applied optimistically at drop and must be
    /// confirmed by an external authority. No live preview.
    Authorized,
}

/// Result of ending a drag.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome<T> {
    /// Nothing to apply.
    Unchanged,
    /// Local reorder; replace the visible board.
    Rearranged(Board<T>),
    /// Dropped outside any target after a preview; the start snapshot.
    Restored(Board<T>),
    /// Optimistic board to show now, plus the move to send to the authority.
    PendingCommit {
        board: Board<T>,
        pending: PendingMove,
    },
}

impl<T> DropOutcome<T> {
    /// Board the host should display, if it changed.
    pub fn board(&self) -> Option<&Board<T>> {
        match self {
            DropOutcome::Unchanged => None,
            DropOutcome::Rearranged(board)
            | DropOutcome::Restored(board)
            | DropOutcome::PendingCommit { board, .. } => Some(board),
        }
    }
}

/// Data for the drag overlay: the dragged value and how to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub value: String,
    pub variant: DragKind,
}

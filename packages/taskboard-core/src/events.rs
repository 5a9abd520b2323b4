/// Events emitted by the engine so the host can re-render and observe drags.
use tokio::sync::broadcast;

use crate::commit::AuthorityError;
use crate::gesture::DragKind;
use crate::types::{Board, ColumnId, ItemId};

/// Why the visible board changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    /// Live cross-column preview while dragging.
    Preview,
    /// Local reorder applied at drop.
    Rearranged,
    /// Drag cancelled; the start snapshot was put back.
    Restored,
    /// Cross-column move applied ahead of the authority's answer.
    Optimistic,
    /// Authority rejected a move; board replaced by a fresh fetch.
    Reconciled,
}

#[derive(Debug, Clone)]
pub enum BoardEvent<T> {
    DragStarted {
        active_id: String,
        kind: DragKind,
    },
    DragEnded {
        active_id: String,
        over_id: Option<String>,
    },
    BoardChanged {
        board: Board<T>,
        reason: ChangeReason,
    },
    CommitFailed {
        item_id: ItemId,
        column_id: ColumnId,
        error: AuthorityError,
    },
}

pub type EventSender<T> = broadcast::Sender<BoardEvent<T>>;

/// Send an event if anyone is listening. The event is only built when a
/// sender is installed.
pub(crate) fn emit<T>(events: &Option<EventSender<T>>, event: impl FnOnce() -> BoardEvent<T>) {
    if let Some(tx) = events {
        let _ = tx.send(event());
    }
}

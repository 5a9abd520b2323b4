/// Drag gesture state machine.
///
/// The tracker never keeps the live board between calls: each event takes the
/// host's current board and returns the board to display next, if any. The
/// only board it holds is the snapshot taken at drag start, used to undo
/// previews when a drag is cancelled.
///
/// Events arriving out of order (over/end/cancel with no active drag, a second
/// start while dragging) are ignored.
use super::{DragKind, DragState, DropOutcome, MovePolicy, Overlay};
use crate::commit::PendingMove;
use crate::events::{emit, BoardEvent, ChangeReason, EventSender};
use crate::types::{Board, BoardItem};

pub struct GestureTracker<T> {
    policy: MovePolicy,
    state: DragState,
    snapshot: Option<Board<T>>,
    previewed: bool,
    events: Option<EventSender<T>>,
}

impl<T: BoardItem + Clone> GestureTracker<T> {
    pub fn new(policy: MovePolicy) -> Self {
        Self {
            policy,
            state: DragState::Idle,
            snapshot: None,
            previewed: false,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventSender<T>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn policy(&self) -> MovePolicy {
        self.policy
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Idle => None,
            DragState::DraggingItem(id) | DragState::DraggingColumn(id) => Some(id),
        }
    }

    pub fn overlay(&self) -> Option<Overlay> {
        match &self.state {
            DragState::Idle => None,
            DragState::DraggingItem(id) => Some(Overlay {
                value: id.clone(),
                variant: DragKind::Item,
            }),
            DragState::DraggingColumn(id) => Some(Overlay {
                value: id.clone(),
                variant: DragKind::Column,
            }),
        }
    }

    /// Begin dragging `id`. Returns false if a drag is already active or the
    /// id is neither a column nor an item on `board`.
    pub fn drag_start(&mut self, board: &Board<T>, id: &str) -> bool {
        if self.is_dragging() {
            log::debug!(
                target: "taskboard.gesture",
                "drag start for {} ignored: {:?} already active",
                id,
                self.state
            );
            return false;
        }

        let (state, kind) = if board.is_column(id) {
            (DragState::DraggingColumn(id.to_string()), DragKind::Column)
        } else if board.find_container(id).is_some() {
            (DragState::DraggingItem(id.to_string()), DragKind::Item)
        } else {
            log::debug!(target: "taskboard.gesture", "drag start for unknown id {}", id);
            return false;
        };

        self.state = state;
        self.snapshot = Some(board.clone());
        self.previewed = false;
        emit(&self.events, || BoardEvent::DragStarted {
            active_id: id.to_string(),
            kind,
        });
        true
    }

    /// Pointer moved over `over_id`. Under `LocalOnly`, an item hovering a
    /// different column is moved there live and the preview board returned.
    /// Same-column hovering is left for the drop.
    pub fn drag_over(&mut self, board: &Board<T>, over_id: &str) -> Option<Board<T>> {
        if self.policy == MovePolicy::Authorized {
            return None;
        }
        let DragState::DraggingItem(active_id) = &self.state else {
            return None;
        };
        if board.is_column(active_id) {
            return None;
        }

        let (preview, _) = cross_column_move(board, active_id, over_id)?;
        self.previewed = true;
        emit(&self.events, || BoardEvent::BoardChanged {
            board: preview.clone(),
            reason: ChangeReason::Preview,
        });
        Some(preview)
    }

    /// Drop over `over_id`, or outside any target when `None`. Always returns
    /// the tracker to `Idle`.
    pub fn drag_end(&mut self, board: &Board<T>, over_id: Option<&str>) -> DropOutcome<T> {
        let state = std::mem::take(&mut self.state);
        let snapshot = self.snapshot.take();
        let previewed = std::mem::take(&mut self.previewed);

        let (active_id, kind) = match state {
            DragState::Idle => {
                log::debug!(target: "taskboard.gesture", "drag end with no active drag ignored");
                return DropOutcome::Unchanged;
            }
            DragState::DraggingItem(id) => (id, DragKind::Item),
            DragState::DraggingColumn(id) => (id, DragKind::Column),
        };

        emit(&self.events, || BoardEvent::DragEnded {
            active_id: active_id.clone(),
            over_id: over_id.map(str::to_string),
        });

        let Some(over_id) = over_id else {
            return self.restore(snapshot, previewed);
        };

        let outcome = match (kind, self.policy) {
            (DragKind::Column, _) => drop_column(board, &active_id, over_id),
            (DragKind::Item, MovePolicy::LocalOnly) => reorder_in_place(board, &active_id, over_id),
            (DragKind::Item, MovePolicy::Authorized) => {
                match cross_column_move(board, &active_id, over_id) {
                    Some((board, pending)) => DropOutcome::PendingCommit { board, pending },
                    None => reorder_in_place(board, &active_id, over_id),
                }
            }
        };

        let reason = match &outcome {
            DropOutcome::PendingCommit { .. } => ChangeReason::Optimistic,
            _ => ChangeReason::Rearranged,
        };
        if let Some(changed) = outcome.board() {
            emit(&self.events, || BoardEvent::BoardChanged {
                board: changed.clone(),
                reason,
            });
        }
        outcome
    }

    /// Abort the active drag (escape key, unmount). Returns the start snapshot
    /// when a preview changed the board, so the host can put it back.
    pub fn drag_cancel(&mut self) -> Option<Board<T>> {
        let state = std::mem::take(&mut self.state);
        let snapshot = self.snapshot.take();
        let previewed = std::mem::take(&mut self.previewed);

        let active_id = match state {
            DragState::Idle => return None,
            DragState::DraggingItem(id) | DragState::DraggingColumn(id) => id,
        };
        emit(&self.events, || BoardEvent::DragEnded {
            active_id,
            over_id: None,
        });

        match self.restore(snapshot, previewed) {
            DropOutcome::Restored(board) => Some(board),
            _ => None,
        }
    }

    fn restore(&self, snapshot: Option<Board<T>>, previewed: bool) -> DropOutcome<T> {
        match snapshot {
            Some(board) if previewed => {
                emit(&self.events, || BoardEvent::BoardChanged {
                    board: board.clone(),
                    reason: ChangeReason::Restored,
                });
                DropOutcome::Restored(board)
            }
            _ => DropOutcome::Unchanged,
        }
    }
}

/// Move the active item into the column under `over_id`: at the end when
/// hovering the column itself, otherwise at the hovered item's index.
/// `None` when either side is unresolved or both share a column.
fn cross_column_move<T: BoardItem + Clone>(
    board: &Board<T>,
    active_id: &str,
    over_id: &str,
) -> Option<(Board<T>, PendingMove)> {
    let from = board.find_container(active_id)?;
    let to = board.find_container(over_id)?;
    if from == to {
        return None;
    }

    let index = if board.is_column(over_id) {
        board.column(to)?.items.len()
    } else {
        board.index_of_item(to, over_id)?
    };

    let moved = board.move_item(active_id, from, to, index);
    let pending = PendingMove {
        item_id: active_id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    };
    Some((moved, pending))
}

/// Same-column reorder at drop, using both items' current indices. Dropping
/// on the column itself, or across columns, changes nothing here.
fn reorder_in_place<T: BoardItem + Clone>(
    board: &Board<T>,
    active_id: &str,
    over_id: &str,
) -> DropOutcome<T> {
    let (Some(from), Some(to)) = (board.find_container(active_id), board.find_container(over_id))
    else {
        return DropOutcome::Unchanged;
    };
    if from != to {
        return DropOutcome::Unchanged;
    }
    match (board.index_of_item(from, active_id), board.index_of_item(from, over_id)) {
        (Some(active_index), Some(over_index)) if active_index != over_index => {
            DropOutcome::Rearranged(board.reorder_within_column(from, active_index, over_index))
        }
        _ => DropOutcome::Unchanged,
    }
}

fn drop_column<T: BoardItem + Clone>(
    board: &Board<T>,
    active_id: &str,
    over_id: &str,
) -> DropOutcome<T> {
    match (board.position_of_column(active_id), board.position_of_column(over_id)) {
        (Some(from), Some(to)) if from != to => DropOutcome::Rearranged(board.move_column(from, to)),
        _ => DropOutcome::Unchanged,
    }
}

/// Finalizes authorized moves.
///
/// The optimistic board is already on screen when `commit` runs. On success
/// nothing else happens. On any failure the optimistic board is discarded in
/// favour of a full refetch, since the authority may have changed other items
/// meanwhile. If the refetch fails too, the host keeps the stale board and is
/// told both errors.
///
/// `commit` borrows `&self`, so several commits may be in flight at once. Each
/// reconciles independently; when more than one refetch lands, the last one
/// applied by the host wins.
use std::future::Future;
use std::time::Duration;

use super::{AuthorityError, MoveAuthority, PendingMove};
use crate::events::{emit, BoardEvent, ChangeReason, EventSender};
use crate::types::{Board, BoardItem};

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome<T> {
    /// The authority accepted the move; the optimistic board stands.
    Confirmed,
    /// Source and target columns match; nothing was sent.
    Skipped,
    /// The move failed and `board` is the authority's current view.
    Reconciled { board: Board<T>, cause: AuthorityError },
    /// The move failed and so did the refetch. The optimistic board is known
    /// to be stale.
    Stale {
        cause: AuthorityError,
        refetch: AuthorityError,
    },
}

pub struct MoveCommitter<A, T> {
    authority: A,
    timeout: Option<Duration>,
    events: Option<EventSender<T>>,
}

impl<A, T> MoveCommitter<A, T>
where
    A: MoveAuthority<T>,
    T: BoardItem + Clone,
{
    pub fn new(authority: A) -> Self {
        Self {
            authority,
            timeout: None,
            events: None,
        }
    }

    /// Fail commits and refetches that take longer than `timeout` with
    /// `NetworkFailure`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_events(mut self, events: EventSender<T>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    pub async fn commit(&self, pending: &PendingMove) -> CommitOutcome<T> {
        if pending.from == pending.to {
            return CommitOutcome::Skipped;
        }

        let cause = match self
            .bounded(self.authority.commit_move(&pending.item_id, &pending.to))
            .await
        {
            Ok(()) => {
                log::info!(
                    target: "taskboard.commit",
                    "Move of {} from {} to {} confirmed",
                    pending.item_id,
                    pending.from,
                    pending.to
                );
                return CommitOutcome::Confirmed;
            }
            Err(e) => e,
        };

        log::warn!(
            target: "taskboard.commit",
            "Move of {} to {} failed, reconciling: {}",
            pending.item_id,
            pending.to,
            cause
        );
        emit(&self.events, || BoardEvent::CommitFailed {
            item_id: pending.item_id.clone(),
            column_id: pending.to.clone(),
            error: cause.clone(),
        });

        match self.fetch_board().await {
            Ok(board) => {
                emit(&self.events, || BoardEvent::BoardChanged {
                    board: board.clone(),
                    reason: ChangeReason::Reconciled,
                });
                CommitOutcome::Reconciled { board, cause }
            }
            Err(refetch) => {
                log::error!(
                    target: "taskboard.commit",
                    "Refetch after failed move of {} also failed: {}",
                    pending.item_id,
                    refetch
                );
                CommitOutcome::Stale { cause, refetch }
            }
        }
    }

    /// Authoritative board, subject to the same timeout as commits.
    pub async fn fetch_board(&self) -> Result<Board<T>, AuthorityError> {
        self.bounded(self.authority.fetch_board()).await
    }

    async fn bounded<R, F>(&self, operation: F) -> Result<R, AuthorityError>
    where
        F: Future<Output = Result<R, AuthorityError>>,
    {
        let Some(limit) = self.timeout else {
            return operation.await;
        };
        match tokio::time::timeout(limit, operation).await {
            Ok(result) => result,
            Err(_) => Err(AuthorityError::NetworkFailure(format!(
                "no response within {}ms",
                limit.as_millis()
            ))),
        }
    }
}

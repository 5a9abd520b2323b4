pub mod committer;

pub use committer::{CommitOutcome, MoveCommitter};

use std::future::Future;

use crate::types::{Board, ColumnId, ItemId};

/// A cross-column move waiting for the authority's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMove {
    pub item_id: ItemId,
    pub from: ColumnId,
    pub to: ColumnId,
}

/// Why the authority did not confirm a move or could not return a board.
///
/// All variants are handled the same way (reconcile from a fresh fetch); they
/// differ only in what the host may tell the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    /// No credentials or session.
    #[error("Authority unavailable: {0}")]
    AuthorityUnavailable(String),

    /// The authority refused the change (validation failure, unknown item).
    #[error("Authority rejected move: {0}")]
    AuthorityRejected(String),

    /// Transport failure or timeout.
    #[error("Network failure: {0}")]
    NetworkFailure(String),
}

/// External system that validates and persists moves.
pub trait MoveAuthority<T> {
    /// Persist that `item_id` now lives in `column_id`.
    fn commit_move(
        &self,
        item_id: &str,
        column_id: &str,
    ) -> impl Future<Output = Result<(), AuthorityError>> + Send;

    /// The authority's complete current board.
    fn fetch_board(&self) -> impl Future<Output = Result<Board<T>, AuthorityError>> + Send;
}

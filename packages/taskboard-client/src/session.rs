/// Host-side state container for one board.
///
/// Holds the current board and applies every engine outcome to it. Commits can
/// run inline through `settle`, or be spawned by the host via `committer()` and
/// applied later with `apply_commit`, so a pending commit never blocks the next
/// drag.
use std::sync::Arc;

use taskboard_core::{
    AuthorityError, Board, BoardEvent, BoardItem, ChangeReason, CommitOutcome, DropOutcome,
    EventSender, GestureTracker, MoveAuthority, MoveCommitter, MovePolicy, PendingMove,
};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("A drag is already in progress")]
    DragInProgress,

    #[error("Move failed and the board was reloaded: {0}")]
    Reconciled(AuthorityError),

    #[error("Move failed ({cause}) and reloading the board also failed: {refetch}")]
    Stale {
        cause: AuthorityError,
        refetch: AuthorityError,
    },
}

pub struct BoardSession<A, T> {
    board: Board<T>,
    tracker: GestureTracker<T>,
    committer: Arc<MoveCommitter<A, T>>,
    events: Option<EventSender<T>>,
}

impl<A, T> BoardSession<A, T>
where
    A: MoveAuthority<T>,
    T: BoardItem + Clone,
{
    pub fn new(board: Board<T>, tracker: GestureTracker<T>, committer: MoveCommitter<A, T>) -> Self {
        Self {
            board,
            tracker,
            committer: Arc::new(committer),
            events: None,
        }
    }

    /// Session whose tracker, committer and refreshes all report to `events`.
    pub fn with_events(
        board: Board<T>,
        policy: MovePolicy,
        committer: MoveCommitter<A, T>,
        events: EventSender<T>,
    ) -> Self {
        Self {
            board,
            tracker: GestureTracker::new(policy).with_events(events.clone()),
            committer: Arc::new(committer.with_events(events.clone())),
            events: Some(events),
        }
    }

    pub fn board(&self) -> &Board<T> {
        &self.board
    }

    pub fn tracker(&self) -> &GestureTracker<T> {
        &self.tracker
    }

    pub fn committer(&self) -> Arc<MoveCommitter<A, T>> {
        Arc::clone(&self.committer)
    }

    pub fn drag_start(&mut self, id: &str) -> bool {
        self.tracker.drag_start(&self.board, id)
    }

    /// Returns true when a live preview changed the board.
    pub fn drag_over(&mut self, over_id: &str) -> bool {
        match self.tracker.drag_over(&self.board, over_id) {
            Some(preview) => {
                self.board = preview;
                true
            }
            None => false,
        }
    }

    /// Finish the drag. Returns the move the authority must confirm, if any;
    /// the optimistic board is already in place by then.
    pub fn drag_end(&mut self, over_id: Option<&str>) -> Option<PendingMove> {
        match self.tracker.drag_end(&self.board, over_id) {
            DropOutcome::Unchanged => None,
            DropOutcome::Rearranged(board) | DropOutcome::Restored(board) => {
                self.board = board;
                None
            }
            DropOutcome::PendingCommit { board, pending } => {
                self.board = board;
                Some(pending)
            }
        }
    }

    pub fn drag_cancel(&mut self) -> bool {
        match self.tracker.drag_cancel() {
            Some(snapshot) => {
                self.board = snapshot;
                true
            }
            None => false,
        }
    }

    /// Replace the board wholesale with the authority's view.
    pub async fn refresh(&mut self) -> Result<(), AuthorityError> {
        self.board = self.committer.fetch_board().await?;
        if let Some(tx) = &self.events {
            let _ = tx.send(BoardEvent::BoardChanged {
                board: self.board.clone(),
                reason: ChangeReason::Reconciled,
            });
        }
        Ok(())
    }

    /// Apply a finished commit. A reconciled board replaces the current one;
    /// a stale result leaves the optimistic board showing.
    pub fn apply_commit(&mut self, outcome: CommitOutcome<T>) -> Result<(), SessionError> {
        match outcome {
            CommitOutcome::Confirmed | CommitOutcome::Skipped => Ok(()),
            CommitOutcome::Reconciled { board, cause } => {
                self.board = board;
                Err(SessionError::Reconciled(cause))
            }
            CommitOutcome::Stale { cause, refetch } => Err(SessionError::Stale { cause, refetch }),
        }
    }

    /// Run the commit for `pending` and apply its outcome.
    pub async fn settle(&mut self, pending: &PendingMove) -> Result<(), SessionError> {
        let outcome = self.committer.commit(pending).await;
        self.apply_commit(outcome)
    }

    /// Drive a whole gesture moving `item_id` to the end of `column_id`, the
    /// way a pointer would, then settle any commit it produces. Returns
    /// `Ok(false)` when the item already sits in that column.
    pub async fn move_item(&mut self, item_id: &str, column_id: &str) -> Result<bool, SessionError> {
        if !self.board.is_column(column_id) {
            return Err(SessionError::UnknownColumn(column_id.to_string()));
        }
        if self.board.is_column(item_id) {
            return Err(SessionError::UnknownItem(item_id.to_string()));
        }
        match self.board.find_container(item_id) {
            None => return Err(SessionError::UnknownItem(item_id.to_string())),
            Some(current) if current == column_id => return Ok(false),
            Some(_) => {}
        }
        if !self.drag_start(item_id) {
            return Err(SessionError::DragInProgress);
        }

        self.drag_over(column_id);
        if let Some(pending) = self.drag_end(Some(column_id)) {
            self.settle(&pending).await?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::tests::{config, serve, task, FakeApi};
    use crate::authority::HttpAuthority;
    use std::sync::Mutex;
    use taskboard_core::{Task, TaskStatus};
    use tokio::sync::broadcast;

    /// Authority with scripted answers.
    struct ScriptedAuthority {
        commit: Result<(), AuthorityError>,
        server: Mutex<Result<Board<String>, AuthorityError>>,
        fetches: Mutex<usize>,
    }

    impl MoveAuthority<String> for ScriptedAuthority {
        async fn commit_move(&self, _item_id: &str, _column_id: &str) -> Result<(), AuthorityError> {
            self.commit.clone()
        }

        async fn fetch_board(&self) -> Result<Board<String>, AuthorityError> {
            *self.fetches.lock().unwrap() += 1;
            self.server.lock().unwrap().clone()
        }
    }

    fn board(columns: &[(&str, &[&str])]) -> Board<String> {
        let mut board = Board::empty();
        for (id, items) in columns {
            board = board
                .with_column(*id, *id, items.iter().map(|s| s.to_string()).collect())
                .unwrap();
        }
        board
    }

    fn session(
        start: Board<String>,
        policy: MovePolicy,
        commit: Result<(), AuthorityError>,
        server: Result<Board<String>, AuthorityError>,
    ) -> BoardSession<ScriptedAuthority, String> {
        let authority = ScriptedAuthority {
            commit,
            server: Mutex::new(server),
            fetches: Mutex::new(0),
        };
        BoardSession::new(start, GestureTracker::new(policy), MoveCommitter::new(authority))
    }

    #[tokio::test]
    async fn test_authorized_move_confirmed() {
        let start = board(&[("todo", &["T1"]), ("doing", &[])]);
        let mut s = session(start.clone(), MovePolicy::Authorized, Ok(()), Ok(start));

        assert!(s.drag_start("T1"));
        assert!(!s.drag_over("doing"));
        let pending = s.drag_end(Some("doing")).unwrap();
        s.settle(&pending).await.unwrap();

        assert_eq!(s.board(), &board(&[("todo", &[]), ("doing", &["T1"])]));
        assert_eq!(*s.committer().authority().fetches.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_authorized_move_rejected_reconciles() {
        let start = board(&[("todo", &["T1"]), ("doing", &[])]);
        let rejected = AuthorityError::AuthorityRejected("Task not found".to_string());
        let mut s = session(start.clone(), MovePolicy::Authorized, Err(rejected.clone()), Ok(start.clone()));

        s.drag_start("T1");
        let pending = s.drag_end(Some("doing")).unwrap();
        assert_eq!(s.board(), &board(&[("todo", &[]), ("doing", &["T1"])]));

        assert_eq!(s.settle(&pending).await, Err(SessionError::Reconciled(rejected)));
        assert_eq!(s.board(), &start);
    }

    #[tokio::test]
    async fn test_stale_board_kept_when_refetch_fails() {
        let start = board(&[("todo", &["T1"]), ("doing", &[])]);
        let mut s = session(
            start,
            MovePolicy::Authorized,
            Err(AuthorityError::NetworkFailure("reset".to_string())),
            Err(AuthorityError::NetworkFailure("offline".to_string())),
        );

        s.drag_start("T1");
        let pending = s.drag_end(Some("doing")).unwrap();
        assert!(matches!(s.settle(&pending).await, Err(SessionError::Stale { .. })));
        assert_eq!(s.board(), &board(&[("todo", &[]), ("doing", &["T1"])]));
        // the session is still usable
        assert!(s.drag_start("T1"));
    }

    #[tokio::test]
    async fn test_drag_not_blocked_by_pending_commit() {
        let start = board(&[("todo", &["T1", "T2"]), ("doing", &[])]);
        let mut s = session(start.clone(), MovePolicy::Authorized, Ok(()), Ok(start));

        s.drag_start("T1");
        let first = s.drag_end(Some("doing")).unwrap();
        let committer = s.committer();
        let in_flight = tokio::spawn(async move { committer.commit(&first).await });

        s.drag_start("T2");
        let second = s.drag_end(Some("T1")).unwrap();
        assert_eq!(s.board(), &board(&[("todo", &[]), ("doing", &["T2", "T1"])]));

        s.apply_commit(in_flight.await.unwrap()).unwrap();
        s.settle(&second).await.unwrap();
        assert_eq!(s.board().item_count(), 2);
    }

    #[tokio::test]
    async fn test_local_move_and_cancel() {
        let start = board(&[("todo", &["T1", "T2"]), ("doing", &[]), ("done", &[])]);
        let mut s = session(
            start.clone(),
            MovePolicy::LocalOnly,
            Err(AuthorityError::AuthorityUnavailable("unused".to_string())),
            Ok(start.clone()),
        );

        assert!(s.move_item("T1", "doing").await.unwrap());
        assert_eq!(s.board(), &board(&[("todo", &["T2"]), ("doing", &["T1"]), ("done", &[])]));

        let before = s.board().clone();
        s.drag_start("T2");
        assert!(s.drag_over("done"));
        assert!(s.drag_cancel());
        assert_eq!(s.board(), &before);
    }

    #[tokio::test]
    async fn test_move_item_validation() {
        let start = board(&[("todo", &["T1"]), ("doing", &[])]);
        let mut s = session(start.clone(), MovePolicy::Authorized, Ok(()), Ok(start));

        assert_eq!(
            s.move_item("T1", "archive").await,
            Err(SessionError::UnknownColumn("archive".to_string()))
        );
        assert_eq!(
            s.move_item("T9", "doing").await,
            Err(SessionError::UnknownItem("T9".to_string()))
        );
        assert_eq!(s.move_item("T1", "todo").await, Ok(false));
    }

    #[tokio::test]
    async fn test_events_reach_one_channel() {
        let start = board(&[("todo", &["T1"]), ("doing", &[])]);
        let (tx, mut rx) = broadcast::channel(16);
        let authority = ScriptedAuthority {
            commit: Err(AuthorityError::AuthorityRejected("no".to_string())),
            server: Mutex::new(Ok(start.clone())),
            fetches: Mutex::new(0),
        };
        let mut s = BoardSession::with_events(
            start.clone(),
            MovePolicy::Authorized,
            MoveCommitter::new(authority),
            tx,
        );

        s.refresh().await.unwrap();
        assert!(matches!(
            rx.try_recv().unwrap(),
            BoardEvent::BoardChanged { reason: ChangeReason::Reconciled, .. }
        ));

        assert!(s.move_item("T1", "doing").await.is_err());
        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event);
        }
        assert!(matches!(seen[0], BoardEvent::DragStarted { .. }));
        assert!(seen.iter().any(|e| matches!(e, BoardEvent::CommitFailed { .. })));
        assert!(matches!(
            seen.last(),
            Some(BoardEvent::BoardChanged { reason: ChangeReason::Reconciled, .. })
        ));
        assert_eq!(s.board(), &start);
    }

    #[tokio::test]
    async fn test_move_task_against_http_api() {
        let api = FakeApi::default();
        *api.tasks.lock().unwrap() = vec![task("t1", TaskStatus::Todo), task("t2", TaskStatus::Todo)];
        let url = serve(api.clone()).await;
        let authority = HttpAuthority::new(&config(&url)).unwrap();
        let mut s: BoardSession<HttpAuthority, Task> = BoardSession::new(
            Board::empty(),
            GestureTracker::new(MovePolicy::Authorized),
            MoveCommitter::new(authority),
        );

        s.refresh().await.unwrap();
        assert!(s.move_item("t2", "done").await.unwrap());
        assert_eq!(s.board().find_container("t2"), Some("done"));
        assert_eq!(api.tasks.lock().unwrap()[1].status, TaskStatus::Done);

        // server refuses the next change: the board goes back to the server's view
        *api.reject_updates.lock().unwrap() = true;
        let result = s.move_item("t1", "doing").await;
        assert!(matches!(
            result,
            Err(SessionError::Reconciled(AuthorityError::AuthorityRejected(_)))
        ));
        assert_eq!(s.board().find_container("t1"), Some("todo"));
        assert_eq!(s.board().find_container("t2"), Some("done"));
    }
}

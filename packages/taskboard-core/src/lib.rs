//! Board engine for a Kanban task board: grouped ordered columns, container
//! resolution, drag gesture tracking and move commits against an external
//! authority.

pub mod collection;
pub mod commit;
pub mod events;
pub mod gesture;
pub mod resolver;
pub mod task;
pub mod types;

pub use commit::{AuthorityError, CommitOutcome, MoveAuthority, MoveCommitter, PendingMove};
pub use events::{BoardEvent, ChangeReason, EventSender};
pub use gesture::{
    keyboard_target, DragKind, DragState, DropOutcome, GestureTracker, KeyDirection, MovePolicy,
    Overlay,
};
pub use task::{Task, TaskAssignee, TaskStatus};
pub use types::{Board, BoardError, BoardItem, Column, ColumnId, ItemId};

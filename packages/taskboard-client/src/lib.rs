//! HTTP-backed host for the task board engine: config, logging, the REST
//! authority and a session that applies engine outcomes to one board.

pub mod api;
pub mod authority;
pub mod config;
pub mod log_bridge;
pub mod session;

pub use authority::{ClientError, HttpAuthority};
pub use config::ClientConfig;
pub use session::{BoardSession, SessionError};

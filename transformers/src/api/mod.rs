//! HTTP API module.
//!
//! Serves the blog store through the transformers, plus a live log stream.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::{LogBroadcaster, LogEntry, LogLevel, LOG_BROADCASTER};
pub use server::{router, start_server, AppState};
pub use types::*;

//! chatsync - Client-side chat synchronization core
//!
//! This library keeps a messaging client's chat list and the transcript of
//! the open chat consistent while history pages, real-time messages and
//! local user actions arrive in any order. Transport, persistence and
//! rendering live outside; they feed [`reconciler::SyncEvent`]s in and read
//! [`snapshot`] views out.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod reconciler;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod tests;

pub use reconciler::{FetchTarget, IgnoreReason, Outcome, SyncEvent};
pub use store::{ChatStore, SharedChatStore};

/// Result type alias for chatsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for chatsync operations
///
/// Only the ambient layers fail. Applying events never does.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Settings could not be read, parsed or written
    #[error("Settings error: {0}")]
    Settings(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Initialize the chatsync library with logging
pub fn init() {
    tracing_subscriber::fmt::init();
}

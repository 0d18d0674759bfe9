//! Crate-wide error type.
//!
//! Module-local error enums (e.g. [`crate::reminder::ValidationError`])
//! convert into this type at the component boundaries, so callers of the
//! engine deal with a single error surface.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A precondition on caller-supplied data failed. Never coerced.
    #[error("invalid reminder: {0}")]
    InvalidReminder(#[from] crate::reminder::ValidationError),

    /// An operation required a persisted reminder that does not exist.
    #[error("reminder {0} not found")]
    ReminderNotFound(i64),

    /// Theme changes require a garden row, which only the first task
    /// completion creates.
    #[error("garden state has not been initialized yet")]
    GardenNotInitialized,

    /// Underlying storage I/O failed.
    #[error("storage i/o: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted row could not be encoded or decoded.
    #[error("row encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The alarm service is no longer accepting commands.
    #[error("alarm scheduler unavailable: {0}")]
    Scheduler(String),
}

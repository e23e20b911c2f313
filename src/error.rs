use std::error::Error as StdError;

use thiserror::Error;

/// Prompter's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Prompter's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// Note that the alignment hot path (`find`, `process`, `tick`) never returns errors at all —
/// degenerate input clamps or yields empty results. `Error` only appears at the session
/// boundary, e.g. when a script with no usable words is loaded.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

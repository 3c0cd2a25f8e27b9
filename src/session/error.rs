// ABOUTME: Session-level error types.
// ABOUTME: Covers credential resolution, connect, and command execution failures.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Credential(#[from] crate::auth::Error),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("connection attempt timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("no active session; connect first")]
    NotConnected,

    /// Remote command wrote to its error stream.
    #[error("Error: {stderr}\nOutput: {stdout}")]
    Command { stdout: String, stderr: String },

    #[error("channel failure: {0}")]
    Channel(String),
}

pub type Result<T> = std::result::Result<T, Error>;

// ABOUTME: Marketplace error types.
// ABOUTME: Covers capacity validation and API request failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no candidate matching cluster {cluster}, node {node}")]
    CandidateNotFound { cluster: String, node: String },

    #[error("requested {requested} GPU(s) but only {available} available")]
    InsufficientCapacity { requested: u32, available: u32 },

    #[error("marketplace request failed: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, Error>;

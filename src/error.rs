// ABOUTME: Crate-level error type with SNAFU pattern.
// ABOUTME: Unifies session, marketplace, and configuration failures for programmatic handling.

use snafu::Snafu;

use crate::market;
use crate::session;

/// Unified error for the tool-facing surface of the crate.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ToolError {
    #[snafu(display("session error: {source}"))]
    Session { source: session::Error },

    #[snafu(display("marketplace error: {source}"))]
    Market { source: market::Error },

    #[snafu(display("missing required environment variable: {name}"))]
    MissingEnv { name: String },
}

/// Error kind for programmatic handling.
///
/// The calling layer switches on this to decide retryability instead of
/// matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Private key file missing or unreadable.
    KeyNotFound,
    /// Connect attempt exceeded its deadline.
    ConnectionTimeout,
    /// Transport reported a fault while connecting.
    ConnectionFault,
    /// No active session for the requested operation.
    NotConnected,
    /// Remote command produced error-stream output.
    CommandFault,
    /// Transport dropped while a command channel was open.
    ChannelFault,
    /// No marketplace candidate matched the request.
    CandidateNotFound,
    /// Requested more GPUs than the candidate has free.
    InsufficientCapacity,
    /// Marketplace request failed at the HTTP level.
    MarketApi,
    /// Process environment is missing required configuration.
    Configuration,
}

impl ErrorKind {
    /// Whether the caller could plausibly retry the operation unchanged.
    pub fn retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::ConnectionTimeout
                | ErrorKind::ConnectionFault
                | ErrorKind::ChannelFault
                | ErrorKind::MarketApi
        )
    }
}

impl ToolError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::Session { source } => match source {
                session::Error::Credential(_) => ErrorKind::KeyNotFound,
                session::Error::ConnectTimeout(_) => ErrorKind::ConnectionTimeout,
                session::Error::Connection(_) => ErrorKind::ConnectionFault,
                session::Error::NotConnected => ErrorKind::NotConnected,
                session::Error::Command { .. } => ErrorKind::CommandFault,
                session::Error::Channel(_) => ErrorKind::ChannelFault,
            },
            ToolError::Market { source } => match source {
                market::Error::CandidateNotFound { .. } => ErrorKind::CandidateNotFound,
                market::Error::InsufficientCapacity { .. } => ErrorKind::InsufficientCapacity,
                market::Error::Api(_) => ErrorKind::MarketApi,
            },
            ToolError::MissingEnv { .. } => ErrorKind::Configuration,
        }
    }
}

impl From<session::Error> for ToolError {
    fn from(source: session::Error) -> Self {
        ToolError::Session { source }
    }
}

impl From<market::Error> for ToolError {
    fn from(source: market::Error) -> Self {
        ToolError::Market { source }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

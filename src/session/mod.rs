// ABOUTME: Remote session management over a pluggable secure transport.
// ABOUTME: Owns the single live session and the per-command execution channel protocol.

mod error;
mod manager;
mod ssh;
pub mod transport;

pub use error::{Error, Result};
pub use manager::{
    CommandResult, ConnectSpec, ConnectionInfo, SessionManager, SessionState,
};
pub use ssh::{RusshTransport, SshSessionManager};

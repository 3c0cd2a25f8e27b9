// ABOUTME: Transport seam for secure-shell providers.
// ABOUTME: Connect, channel, and event contracts implemented by russh and by test fakes.

use crate::auth::Credential;
use async_trait::async_trait;
use thiserror::Error;

/// Endpoint parameters for a connection attempt.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub username: String,
}

/// Errors surfaced by a transport provider.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("authentication failed: no valid credentials")]
    AuthenticationFailed,

    #[error("unable to use private key: {0}")]
    Key(String),

    #[error("channel failure: {0}")]
    Channel(String),
}

/// One event from an open command channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    Exit(u32),
    /// Orderly end of the channel; no further events follow.
    Closed,
}

/// Opens secure-shell connections.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Handle: TransportHandle;

    /// Open and authenticate a connection to `endpoint`.
    async fn connect(
        &self,
        endpoint: &Endpoint,
        credential: &Credential,
    ) -> Result<Self::Handle, TransportError>;
}

/// An established connection that can run command channels.
#[async_trait]
pub trait TransportHandle: Send + Sync + 'static {
    /// Open a fresh execution channel over this connection.
    async fn open_channel(&self) -> Result<Box<dyn CommandChannel>, TransportError>;

    /// Close the connection. Any open channel must end as a result, so a
    /// suspended `recv` resolves instead of hanging.
    async fn close(&self) -> Result<(), TransportError>;
}

/// A per-command sub-stream carrying separate output and error streams and a
/// completion signal.
#[async_trait]
pub trait CommandChannel: Send {
    /// Start `command` on the remote side.
    async fn exec(&mut self, command: &str) -> Result<(), TransportError>;

    /// Receive the next channel event. An `Err` is a transport fault; the
    /// session is not assumed to survive it.
    async fn recv(&mut self) -> Result<ChannelEvent, TransportError>;
}

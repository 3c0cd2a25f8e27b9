// ABOUTME: Single-session state machine for remote command execution.
// ABOUTME: Connect with timeout race, strictly serialized execute, idempotent disconnect.

use super::error::{Error, Result};
use super::transport::{ChannelEvent, CommandChannel, Endpoint, Transport, TransportHandle};
use crate::auth;
use crate::config::Settings;
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Parameters for a connect attempt.
#[derive(Debug, Clone)]
pub struct ConnectSpec {
    pub host: String,
    pub username: String,
    /// Inline password; takes precedence over any key input.
    pub password: Option<String>,
    /// Explicit private key path; falls back to env default, then `~/.ssh/id_rsa`.
    pub key_path: Option<PathBuf>,
    pub port: u16,
    pub timeout: Duration,
}

impl ConnectSpec {
    pub fn new(host: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: None,
            key_path: None,
            port: 22,
            timeout: Duration::from_millis(10_000),
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Session lifecycle state.
///
/// Connecting is terminal-per-attempt: it resolves to Connected or back to
/// Disconnected, never partially connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Read-only status snapshot for callers.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub connected: bool,
    pub host: Option<String>,
    pub username: Option<String>,
}

/// Aggregated result of one remote command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    /// Exit status when the transport reported one. Informational: error
    /// classification is based on error-stream output, not this value.
    pub exit_status: Option<u32>,
}

struct Inner<H> {
    state: SessionState,
    endpoint: Option<Endpoint>,
    handle: Option<Arc<H>>,
}

/// Owns the zero-or-one live secure-shell session for the process.
///
/// One instance is constructed at startup and shared by reference. A new
/// connect supersedes any prior session; a transport handle is held iff the
/// state is Connected.
pub struct SessionManager<T: Transport> {
    transport: T,
    settings: Settings,
    inner: Mutex<Inner<T::Handle>>,
    /// Serializes connect/teardown cycles so an attempt fully resolves
    /// before the next one starts.
    connect_gate: tokio::sync::Mutex<()>,
    /// Serializes command execution; one command occupies the session until
    /// its full round trip completes.
    exec_gate: tokio::sync::Mutex<()>,
}

impl<T: Transport> SessionManager<T> {
    pub fn new(transport: T, settings: Settings) -> Self {
        Self {
            transport,
            settings,
            inner: Mutex::new(Inner {
                state: SessionState::Disconnected,
                endpoint: None,
                handle: None,
            }),
            connect_gate: tokio::sync::Mutex::new(()),
            exec_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Connect to the remote host, superseding any existing session.
    ///
    /// Exactly one of {ready, fault, timeout} resolves the attempt: the
    /// transport future is dropped when the timer wins, so a late ready or
    /// fault cannot fire afterwards.
    pub async fn connect(&self, spec: ConnectSpec) -> Result<()> {
        let _gate = self.connect_gate.lock().await;

        self.teardown().await;

        let credential = auth::resolve(
            spec.password.as_deref(),
            spec.key_path.as_deref(),
            &self.settings,
        )?;

        let endpoint = Endpoint {
            host: spec.host,
            port: spec.port,
            username: spec.username,
        };

        self.inner.lock().state = SessionState::Connecting;
        tracing::debug!(host = %endpoint.host, port = endpoint.port, "opening session");

        let handle = match tokio::time::timeout(
            spec.timeout,
            self.transport.connect(&endpoint, &credential),
        )
        .await
        {
            Err(_) => {
                self.inner.lock().state = SessionState::Disconnected;
                return Err(Error::ConnectTimeout(spec.timeout));
            }
            Ok(Err(e)) => {
                self.inner.lock().state = SessionState::Disconnected;
                return Err(Error::Connection(e.to_string()));
            }
            Ok(Ok(handle)) => handle,
        };

        tracing::info!(host = %endpoint.host, user = %endpoint.username, "session established");

        let mut inner = self.inner.lock();
        inner.state = SessionState::Connected;
        inner.endpoint = Some(endpoint);
        inner.handle = Some(Arc::new(handle));
        Ok(())
    }

    /// Execute a command over the held session.
    ///
    /// Opens one channel per call and accumulates both streams until the
    /// channel closes. Any error-stream output classifies the command as
    /// failed. Concurrent calls serialize; each full round trip completes
    /// before the next starts.
    pub async fn execute(&self, command: &str) -> Result<CommandResult> {
        let _gate = self.exec_gate.lock().await;

        let handle = {
            let inner = self.inner.lock();
            match (inner.state, &inner.handle) {
                (SessionState::Connected, Some(handle)) => Arc::clone(handle),
                _ => return Err(Error::NotConnected),
            }
        };

        tracing::debug!(command, "executing remote command");
        let result = Self::run_command(handle.as_ref(), command).await;

        if let Err(Error::Channel(_)) = &result {
            // The session is not assumed to survive a channel fault. A
            // superseding connect may have installed a new session while
            // this command was in flight; leave that one alone.
            let mut inner = self.inner.lock();
            if inner
                .handle
                .as_ref()
                .is_some_and(|h| Arc::ptr_eq(h, &handle))
            {
                inner.state = SessionState::Disconnected;
                inner.endpoint = None;
                inner.handle = None;
            }
        }

        result
    }

    async fn run_command(handle: &T::Handle, command: &str) -> Result<CommandResult> {
        let mut channel = handle
            .open_channel()
            .await
            .map_err(|e| Error::Channel(e.to_string()))?;

        channel
            .exec(command)
            .await
            .map_err(|e| Error::Channel(e.to_string()))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_status = None;

        // Both streams accumulate fully; the result exists only once the
        // channel's close event arrives.
        loop {
            match channel.recv().await {
                Ok(ChannelEvent::Stdout(data)) => stdout.extend_from_slice(&data),
                Ok(ChannelEvent::Stderr(data)) => stderr.extend_from_slice(&data),
                Ok(ChannelEvent::Exit(status)) => exit_status = Some(status),
                Ok(ChannelEvent::Closed) => break,
                Err(e) => return Err(Error::Channel(e.to_string())),
            }
        }

        let stdout = String::from_utf8_lossy(&stdout).to_string();
        let stderr = String::from_utf8_lossy(&stderr).to_string();

        if !stderr.is_empty() {
            return Err(Error::Command { stdout, stderr });
        }

        Ok(CommandResult {
            stdout,
            stderr,
            exit_status,
        })
    }

    /// Reports true only while a session is held.
    pub fn is_connected(&self) -> bool {
        self.inner.lock().state == SessionState::Connected
    }

    /// Current session status. Pure read.
    pub fn connection_info(&self) -> ConnectionInfo {
        let inner = self.inner.lock();
        ConnectionInfo {
            connected: inner.state == SessionState::Connected,
            host: inner.endpoint.as_ref().map(|e| e.host.clone()),
            username: inner.endpoint.as_ref().map(|e| e.username.clone()),
        }
    }

    /// Tear down the session if one exists. Idempotent; never an error.
    pub async fn disconnect(&self) {
        let _gate = self.connect_gate.lock().await;
        self.teardown().await;
    }

    /// Clear state first, then close the transport best-effort. State is
    /// cleared regardless of whether the close succeeds.
    async fn teardown(&self) {
        let handle = {
            let mut inner = self.inner.lock();
            inner.state = SessionState::Disconnected;
            inner.endpoint = None;
            inner.handle.take()
        };

        if let Some(handle) = handle {
            if let Err(e) = handle.close().await {
                tracing::debug!("transport close failed: {e}");
            }
        }
    }
}

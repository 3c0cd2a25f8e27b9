// ABOUTME: Scripted in-process transport fake for session manager tests.
// ABOUTME: Records connect/open/close calls and replays per-command channel scripts.

use async_trait::async_trait;
use gpurent::auth::Credential;
use gpurent::session::transport::{
    ChannelEvent, CommandChannel, Endpoint, Transport, TransportError, TransportHandle,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// What the next connect attempt should do. Defaults to `Ready`.
pub enum ConnectScript {
    Ready,
    Fault(&'static str),
    /// Never resolves; exercises the caller-side timeout.
    Hang,
}

/// One scripted command execution.
pub struct ExecScript {
    events: Vec<ChannelEvent>,
    /// Transport fault delivered after the events instead of a close.
    fault_after: Option<&'static str>,
    /// Hold the channel open this long before delivering events.
    delay: Option<Duration>,
}

impl ExecScript {
    /// Clean run: stdout, exit 0, close.
    pub fn stdout(text: &str) -> Self {
        Self {
            events: vec![
                ChannelEvent::Stdout(text.as_bytes().to_vec()),
                ChannelEvent::Exit(0),
                ChannelEvent::Closed,
            ],
            fault_after: None,
            delay: None,
        }
    }

    /// Run that writes both streams and exits nonzero.
    pub fn with_stderr(stdout: &str, stderr: &str) -> Self {
        Self {
            events: vec![
                ChannelEvent::Stdout(stdout.as_bytes().to_vec()),
                ChannelEvent::Stderr(stderr.as_bytes().to_vec()),
                ChannelEvent::Exit(1),
                ChannelEvent::Closed,
            ],
            fault_after: None,
            delay: None,
        }
    }

    /// Transport drop mid-command.
    pub fn fault(message: &'static str) -> Self {
        Self {
            events: vec![],
            fault_after: Some(message),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Per-connection spy counters, shared with the channels it opens.
#[derive(Default)]
pub struct HandleState {
    pub close_calls: AtomicUsize,
    pub channel_opens: AtomicUsize,
    pub open_channels: AtomicUsize,
    pub max_open_channels: AtomicUsize,
    is_closed: AtomicBool,
    closed: Notify,
}

#[derive(Default)]
pub struct FakeTransport {
    connect_scripts: Mutex<VecDeque<ConnectScript>>,
    exec_scripts: Arc<Mutex<VecDeque<ExecScript>>>,
    pub connect_calls: AtomicUsize,
    handles: Mutex<Vec<Arc<HandleState>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_connect(&self, script: ConnectScript) {
        self.connect_scripts.lock().push_back(script);
    }

    pub fn script_exec(&self, script: ExecScript) {
        self.exec_scripts.lock().push_back(script);
    }

    /// Spy state of the n-th connection this transport opened.
    pub fn handle(&self, index: usize) -> Arc<HandleState> {
        Arc::clone(&self.handles.lock()[index])
    }

    pub fn handle_count(&self) -> usize {
        self.handles.lock().len()
    }

    async fn connect_impl(&self) -> Result<FakeHandle, TransportError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);

        let script = self
            .connect_scripts
            .lock()
            .pop_front()
            .unwrap_or(ConnectScript::Ready);

        match script {
            ConnectScript::Ready => {
                let state = Arc::new(HandleState::default());
                self.handles.lock().push(Arc::clone(&state));
                Ok(FakeHandle {
                    state,
                    scripts: Arc::clone(&self.exec_scripts),
                })
            }
            ConnectScript::Fault(message) => {
                Err(TransportError::Connection(message.to_string()))
            }
            ConnectScript::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future resolved")
            }
        }
    }
}

/// Local newtype so the foreign `Transport` trait can be implemented for a
/// shared `FakeTransport` (the orphan rule forbids `impl Transport for
/// Arc<FakeTransport>` directly). Behaves identically to the inner transport;
/// tests keep a separate `Arc<FakeTransport>` clone to inspect recorded state.
pub struct SharedFake(pub Arc<FakeTransport>);

#[async_trait]
impl Transport for SharedFake {
    type Handle = FakeHandle;

    async fn connect(
        &self,
        _endpoint: &Endpoint,
        _credential: &Credential,
    ) -> Result<FakeHandle, TransportError> {
        self.0.connect_impl().await
    }
}

pub struct FakeHandle {
    state: Arc<HandleState>,
    scripts: Arc<Mutex<VecDeque<ExecScript>>>,
}

#[async_trait]
impl TransportHandle for FakeHandle {
    async fn open_channel(&self) -> Result<Box<dyn CommandChannel>, TransportError> {
        if self.state.is_closed.load(Ordering::SeqCst) {
            return Err(TransportError::Channel("handle closed".to_string()));
        }

        self.state.channel_opens.fetch_add(1, Ordering::SeqCst);
        let now_open = self.state.open_channels.fetch_add(1, Ordering::SeqCst) + 1;
        self.state
            .max_open_channels
            .fetch_max(now_open, Ordering::SeqCst);

        let script = self
            .scripts
            .lock()
            .pop_front()
            .unwrap_or_else(|| ExecScript::stdout(""));

        Ok(Box::new(FakeChannel {
            state: Arc::clone(&self.state),
            events: script.events.into(),
            fault_after: script.fault_after,
            delay: script.delay,
        }))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.state.close_calls.fetch_add(1, Ordering::SeqCst);
        self.state.is_closed.store(true, Ordering::SeqCst);
        self.state.closed.notify_waiters();
        Ok(())
    }
}

struct FakeChannel {
    state: Arc<HandleState>,
    events: VecDeque<ChannelEvent>,
    fault_after: Option<&'static str>,
    delay: Option<Duration>,
}

#[async_trait]
impl CommandChannel for FakeChannel {
    async fn exec(&mut self, _command: &str) -> Result<(), TransportError> {
        Ok(())
    }

    async fn recv(&mut self) -> Result<ChannelEvent, TransportError> {
        if self.state.is_closed.load(Ordering::SeqCst) {
            return Err(TransportError::Channel(
                "connection closed while channel was open".to_string(),
            ));
        }

        let state = Arc::clone(&self.state);
        let closed = state.closed.notified();
        tokio::pin!(closed);

        let step = async {
            if let Some(delay) = self.delay.take() {
                tokio::time::sleep(delay).await;
            }
            match self.events.pop_front() {
                Some(event) => Ok(event),
                None => match self.fault_after {
                    Some(message) => Err(TransportError::Channel(message.to_string())),
                    None => Ok(ChannelEvent::Closed),
                },
            }
        };

        tokio::select! {
            result = step => result,
            _ = &mut closed => Err(TransportError::Channel(
                "connection closed while channel was open".to_string(),
            )),
        }
    }
}

impl Drop for FakeChannel {
    fn drop(&mut self) {
        self.state.open_channels.fetch_sub(1, Ordering::SeqCst);
    }
}

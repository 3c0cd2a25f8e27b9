// ABOUTME: Production transport backed by russh.
// ABOUTME: Password and key authentication, channel events from the russh message stream.

use super::manager::SessionManager;
use super::transport::{
    ChannelEvent, CommandChannel, Endpoint, Transport, TransportError, TransportHandle,
};
use crate::auth::Credential;
use async_trait::async_trait;
use russh::client::{self, Config, Handle, Msg};
use russh::keys::{PrivateKeyWithHashAlg, decode_secret_key, ssh_key};
use russh::{Channel, ChannelMsg, Disconnect};
use std::sync::Arc;
use std::time::Duration;

/// Session manager bound to the russh transport.
pub type SshSessionManager = SessionManager<RusshTransport>;

/// Transport provider backed by russh.
#[derive(Debug, Clone, Copy, Default)]
pub struct RusshTransport;

/// Accepts server host keys. Rented nodes come up with freshly generated
/// host keys, so there is no prior key to verify against.
struct AcceptingHandler {
    host: String,
    port: u16,
}

impl client::Handler for AcceptingHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        tracing::debug!("accepting host key for {}:{}", self.host, self.port);
        Ok(true)
    }
}

#[async_trait]
impl Transport for RusshTransport {
    type Handle = RusshHandle;

    async fn connect(
        &self,
        endpoint: &Endpoint,
        credential: &Credential,
    ) -> Result<RusshHandle, TransportError> {
        let config = Config {
            inactivity_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let handler = AcceptingHandler {
            host: endpoint.host.clone(),
            port: endpoint.port,
        };

        let mut handle = client::connect(
            Arc::new(config),
            (endpoint.host.as_str(), endpoint.port),
            handler,
        )
        .await
        .map_err(|e| TransportError::Connection(e.to_string()))?;

        if !authenticate(&mut handle, endpoint, credential).await? {
            return Err(TransportError::AuthenticationFailed);
        }

        Ok(RusshHandle { inner: handle })
    }
}

async fn authenticate(
    handle: &mut Handle<AcceptingHandler>,
    endpoint: &Endpoint,
    credential: &Credential,
) -> Result<bool, TransportError> {
    match credential {
        Credential::Password(password) => {
            let result = handle
                .authenticate_password(&endpoint.username, password)
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))?;
            Ok(result.success())
        }
        Credential::Key(material) => {
            // Passphrase-free keys only; an encrypted key fails to decode here.
            let key =
                decode_secret_key(material, None).map_err(|e| TransportError::Key(e.to_string()))?;

            let hash_alg = handle
                .best_supported_rsa_hash()
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))?
                .flatten();

            let result = handle
                .authenticate_publickey(
                    &endpoint.username,
                    PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                )
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))?;
            Ok(result.success())
        }
    }
}

/// An authenticated russh connection.
pub struct RusshHandle {
    inner: Handle<AcceptingHandler>,
}

impl std::fmt::Debug for RusshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshHandle")
            .field("inner", &"<russh::Handle>")
            .finish()
    }
}

#[async_trait]
impl TransportHandle for RusshHandle {
    async fn open_channel(&self) -> Result<Box<dyn CommandChannel>, TransportError> {
        let channel = self
            .inner
            .channel_open_session()
            .await
            .map_err(|e| TransportError::Channel(format!("failed to open channel: {e}")))?;
        Ok(Box::new(RusshChannel { inner: channel }))
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))
    }
}

struct RusshChannel {
    inner: Channel<Msg>,
}

#[async_trait]
impl CommandChannel for RusshChannel {
    async fn exec(&mut self, command: &str) -> Result<(), TransportError> {
        self.inner
            .exec(true, command)
            .await
            .map_err(|e| TransportError::Channel(format!("failed to exec command: {e}")))
    }

    async fn recv(&mut self) -> Result<ChannelEvent, TransportError> {
        loop {
            match self.inner.wait().await {
                Some(ChannelMsg::Data { data }) => return Ok(ChannelEvent::Stdout(data.to_vec())),
                Some(ChannelMsg::ExtendedData { data, ext }) if ext == 1 => {
                    return Ok(ChannelEvent::Stderr(data.to_vec()));
                }
                Some(ChannelMsg::ExitStatus { exit_status }) => {
                    return Ok(ChannelEvent::Exit(exit_status));
                }
                Some(ChannelMsg::Close) => return Ok(ChannelEvent::Closed),
                // The message stream ending without a Close means the
                // connection dropped under the channel.
                None => {
                    return Err(TransportError::Channel(
                        "connection closed while channel was open".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }
    }
}

//! Connection to the inspector server

use std::time::{Duration, Instant};

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_util::codec::Framed;

use sceneterm_protocol::{ClientCodec, Envelope, Reply};
use sceneterm_utils::{ConnectionSettings, Result, SceneTermError, TRANSPORT_TARGET};

use super::backoff::Backoff;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        *self == Self::Connected
    }
}

/// Client connection to the inspector server
///
/// Dials lazily on the first request and again after the link is dropped.
/// Strictly one request in flight: each call writes one envelope and waits
/// for its reply.
pub struct Connection {
    /// `host:port` to dial
    addr: String,
    /// Bound on one exchange (and on dialing)
    timeout: Duration,
    /// Current state, observable by the UI
    state: watch::Sender<ConnectionState>,
    /// Framed transport while connected
    framed: Option<Framed<TcpStream, ClientCodec>>,
    backoff: Backoff,
    /// Set after the first successful dial
    was_connected: bool,
    /// Requests issued so far, in wire order
    issued: u64,
}

impl Connection {
    /// Create a new connection (not yet connected)
    pub fn new(settings: &ConnectionSettings) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            addr: settings.socket_addr(),
            timeout: settings.request_timeout(),
            state,
            framed: None,
            backoff: Backoff::new(),
            was_connected: false,
            issued: 0,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Get current connection state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Number the next request; numbers follow wire order
    pub fn next_sequence(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    /// Connect to the server unless already connected
    ///
    /// Fails fast while a previous failure's backoff window is open.
    pub async fn connect(&mut self) -> Result<()> {
        if self.framed.is_some() {
            return Ok(());
        }

        let now = Instant::now();
        if !self.backoff.ready(now) {
            return Err(SceneTermError::connection(format!(
                "Waiting {}ms before reconnecting to {}",
                self.backoff.remaining(now).as_millis(),
                self.addr
            )));
        }

        self.set_state(if self.was_connected {
            ConnectionState::Reconnecting
        } else {
            ConnectionState::Connecting
        });

        let dialed = tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await;
        let stream = match dialed {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(self.dial_failed(e.to_string())),
            Err(_) => return Err(self.dial_failed("timed out".into())),
        };

        // Requests are small and latency-bound.
        let _ = stream.set_nodelay(true);
        self.framed = Some(Framed::new(stream, ClientCodec::new()));
        self.backoff.succeed();
        self.was_connected = true;
        self.set_state(ConnectionState::Connected);
        tracing::info!(addr = %self.addr, "connected to inspector server");
        Ok(())
    }

    fn dial_failed(&mut self, reason: String) -> SceneTermError {
        let delay = self.backoff.fail(Instant::now());
        self.set_state(if self.was_connected {
            ConnectionState::Reconnecting
        } else {
            ConnectionState::Disconnected
        });
        tracing::debug!(
            target: TRANSPORT_TARGET,
            addr = %self.addr,
            retry_ms = delay.as_millis() as u64,
            "dial failed: {}",
            reason
        );
        SceneTermError::connection(format!("Failed to connect to {}: {}", self.addr, reason))
    }

    /// Disconnect from server
    pub fn disconnect(&mut self) {
        self.framed = None;
        self.set_state(ConnectionState::Disconnected);
    }

    /// Drop a broken link; the next request dials again
    fn drop_link(&mut self, error: &SceneTermError) {
        if self.framed.take().is_some() {
            tracing::debug!(target: TRANSPORT_TARGET, addr = %self.addr, "dropping connection: {}", error);
        }
        self.set_state(ConnectionState::Reconnecting);
    }

    /// Send one request and wait for the matching reply
    ///
    /// Any failure other than a server-side rejection drops the link, so a
    /// late reply can never be read as the answer to a later request.
    pub async fn request(&mut self, envelope: Envelope) -> Result<Envelope> {
        self.connect().await?;

        let timeout = self.timeout;
        let result = match self.framed.as_mut() {
            Some(framed) => match tokio::time::timeout(timeout, exchange(framed, envelope)).await {
                Ok(result) => result,
                Err(_) => Err(SceneTermError::ConnectionTimeout {
                    millis: timeout.as_millis() as u64,
                }),
            },
            None => Err(SceneTermError::ConnectionClosed),
        };

        match result {
            Ok(Reply::Accepted(envelope)) => Ok(envelope),
            Ok(Reply::Rejected { kind, reason }) => {
                tracing::debug!(target: TRANSPORT_TARGET, %kind, "request rejected: {}", reason);
                Err(SceneTermError::Rejected { kind, reason })
            }
            Err(e) => {
                self.drop_link(&e);
                Err(e)
            }
        }
    }
}

async fn exchange(framed: &mut Framed<TcpStream, ClientCodec>, envelope: Envelope) -> Result<Reply> {
    framed.send(envelope).await?;
    match framed.next().await {
        Some(reply) => Ok(reply?),
        None => Err(SceneTermError::ConnectionClosed),
    }
}

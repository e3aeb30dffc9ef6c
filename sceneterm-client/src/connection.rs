//! Client-server connection management
//!
//! Provides the TCP connection to the inspector server with framing,
//! request timeouts and paced reconnection.

mod backoff;
mod client;

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use sceneterm_protocol::{Envelope, Message, Packet};
use sceneterm_utils::{ConnectionSettings, Result, SceneTermError};

pub use client::{Connection, ConnectionState};

/// Shared handle used by the pollers and the UI
///
/// The mutex serializes requests, keeping one in flight on the wire.
#[derive(Clone)]
pub struct InspectorClient {
    conn: Arc<Mutex<Connection>>,
    state: watch::Receiver<ConnectionState>,
}

impl InspectorClient {
    pub fn new(settings: &ConnectionSettings) -> Self {
        let conn = Connection::new(settings);
        let state = conn.subscribe();
        Self {
            conn: Arc::new(Mutex::new(conn)),
            state,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Send a typed request and decode the same-kind response
    pub async fn send<M: Message>(&self, request: M) -> Result<M> {
        let (_, response) = self.send_sequenced(request).await?;
        Ok(response)
    }

    /// Like [`send`](Self::send), also returning the request's sequence
    /// number. Numbers grow in the order requests reached the wire.
    pub async fn send_sequenced<M: Message>(&self, request: M) -> Result<(u64, M)> {
        let (seq, reply) = self.exchange(request.encode()?).await?;
        Ok((seq, M::decode(&reply)?))
    }

    /// Send an already-built packet; used by the ordered request queue
    pub async fn send_packet(&self, request: Packet) -> Result<(u64, Packet)> {
        let (seq, reply) = self.exchange(request.encode()?).await?;
        Ok((seq, Packet::decode(&reply)?))
    }

    async fn exchange(&self, envelope: Envelope) -> Result<(u64, Envelope)> {
        let (seq, reply) = {
            let mut conn = self.conn.lock().await;
            let seq = conn.next_sequence();
            (seq, conn.request(envelope.clone()).await?)
        };
        if reply.kind != envelope.kind {
            return Err(SceneTermError::InvalidMessage(format!(
                "expected {} response, got {}",
                envelope.kind, reply.kind
            )));
        }
        Ok((seq, reply))
    }

    pub async fn disconnect(&self) {
        self.conn.lock().await.disconnect();
    }
}

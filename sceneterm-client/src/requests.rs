//! Ordered queue for user-issued requests
//!
//! Mutations act on whatever node the server has selected, so a
//! `NodeSelect` followed by `NodeDelete` must reach the wire in that order.
//! One long-lived task drains the queue, sending requests one at a time and
//! posting each outcome to the UI before taking the next.

use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;

use sceneterm_protocol::{Message, Packet};
use sceneterm_utils::TRANSPORT_TARGET;

use crate::connection::InspectorClient;
use crate::ui::AppEvent;

pub struct RequestQueue {
    tx: UnboundedSender<Packet>,
    handle: JoinHandle<()>,
}

impl RequestQueue {
    pub fn spawn(client: &InspectorClient, events: UnboundedSender<AppEvent>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Packet>();
        let client = client.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let kind = request.kind();
                let event = match client.send_packet(request).await {
                    Ok((seq, packet)) => AppEvent::Response { seq, packet },
                    Err(e) => AppEvent::RequestFailed {
                        kind,
                        error: e.to_string(),
                    },
                };
                if events.send(event).is_err() {
                    break;
                }
            }
        });

        Self { tx, handle }
    }

    /// Queue a request behind every request pushed before it
    pub fn push<M: Message>(&self, request: M) {
        let packet = request.into_packet();
        let kind = packet.kind();
        if self.tx.send(packet).is_err() {
            tracing::debug!(target: TRANSPORT_TARGET, %kind, "request queue closed, dropping request");
        }
    }
}

impl Drop for RequestQueue {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

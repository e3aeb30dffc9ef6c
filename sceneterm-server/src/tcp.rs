//! TCP listener serving one inspector at a time
//!
//! Connections only frame and forward envelopes. Each request is queued for
//! the host thread together with a oneshot for its reply, so handlers never
//! run concurrently with the host's own use of the scene.

use futures::{SinkExt, StreamExt};
use sceneterm_protocol::{Envelope, Reply, ServerCodec};
use sceneterm_utils::TRANSPORT_TARGET;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A decoded envelope waiting to be handled on the host thread
#[derive(Debug)]
pub struct Request {
    pub envelope: Envelope,
    pub reply_tx: oneshot::Sender<Reply>,
}

/// Run the TCP accept loop until shutdown.
///
/// A newly accepted inspector supersedes the previous one.
pub async fn run_tcp_accept_loop(
    listener: TcpListener,
    requests: mpsc::Sender<Request>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut current: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer_addr)) => {
                        let connection_id = Uuid::new_v4();
                        info!(%peer_addr, %connection_id, "inspector connected");
                        if let Some(previous) = current.take() {
                            previous.abort();
                        }
                        let requests = requests.clone();
                        current = Some(tokio::spawn(async move {
                            handle_connection(stream, connection_id, requests).await;
                        }));
                    }
                    Err(e) => {
                        error!("TCP accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received, stopping TCP accept loop");
                break;
            }
        }
    }

    if let Some(previous) = current.take() {
        previous.abort();
    }
}

async fn handle_connection(stream: TcpStream, connection_id: Uuid, requests: mpsc::Sender<Request>) {
    let mut framed = Framed::new(stream, ServerCodec::new());

    while let Some(frame) = framed.next().await {
        let envelope = match frame {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(target: TRANSPORT_TARGET, %connection_id, "dropping connection, bad frame: {}", e);
                break;
            }
        };

        let reply = match envelope.message_kind() {
            Err(e) => {
                warn!(target: TRANSPORT_TARGET, %connection_id, kind = %envelope.kind, "rejecting request: {}", e);
                Reply::rejected(envelope.kind.clone(), e)
            }
            Ok(_) => {
                let (reply_tx, reply_rx) = oneshot::channel();
                if requests.send(Request { envelope, reply_tx }).await.is_err() {
                    debug!(target: TRANSPORT_TARGET, %connection_id, "host stopped accepting requests");
                    break;
                }
                match reply_rx.await {
                    Ok(reply) => reply,
                    Err(_) => break,
                }
            }
        };

        if let Err(e) = framed.send(reply).await {
            debug!(target: TRANSPORT_TARGET, %connection_id, "failed to send reply: {}", e);
            break;
        }
    }

    info!(%connection_id, "inspector disconnected");
}

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, trace, warn};

use super::{Channel, ChannelError, ChannelEvent};

pub mod config;
use config::Endpoint;

/// WebSocket implementation of [`Channel`]. Opening spawns a task that
/// connects, reports `Opened`, relays frames in both directions and reports
/// `Closed` exactly once when the socket ends.
pub struct WebSocketChannel {
    outbound: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    socket_task: Option<JoinHandle<()>>,
}

impl WebSocketChannel {
    /// Starts connecting in the background. Must be called inside a Tokio runtime.
    pub fn open(endpoint: Endpoint) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<String>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<ChannelEvent>();

        let url = endpoint.url();
        let socket_task = tokio::spawn(async move {
            handle_websocket(url, outbound_rx, event_tx).await;
        });

        Self {
            outbound: outbound_tx,
            events: event_rx,
            socket_task: Some(socket_task),
        }
    }

    /// Stops the socket task. Pending events are discarded.
    pub async fn close(&mut self) {
        if let Some(task) = self.socket_task.take() {
            task.abort();
            let _ = task.await;
        }
        self.events.close();
    }
}

#[async_trait]
impl Channel for WebSocketChannel {
    async fn send(&mut self, text: String) -> Result<(), ChannelError> {
        self.outbound
            .send(text)
            .map_err(|_| ChannelError::Disconnected)
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }
}

impl Drop for WebSocketChannel {
    fn drop(&mut self) {
        if let Some(task) = self.socket_task.take() {
            task.abort();
        }
    }
}

async fn handle_websocket(
    url: String,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ChannelEvent>,
) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(err) => {
            warn!(url = %url, error = %err, "websocket connect failed");
            let _ = events.send(ChannelEvent::Error(ChannelError::Connect(err.to_string())));
            let _ = events.send(ChannelEvent::Closed);
            return;
        }
    };
    debug!(url = %url, "websocket connected");
    if events.send(ChannelEvent::Opened).is_err() {
        return;
    }

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let mut outbound_open = true;

    loop {
        tokio::select! {
            queued = outbound.recv(), if outbound_open => match queued {
                Some(text) => {
                    trace!(bytes = text.len(), "sending frame");
                    if let Err(err) = ws_sender.send(Message::Text(text)).await {
                        let _ = events.send(ChannelEvent::Error(ChannelError::SendFailed(
                            err.to_string(),
                        )));
                        break;
                    }
                }
                None => outbound_open = false,
            },
            incoming = ws_receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if events.send(ChannelEvent::Message(text)).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Binary(bytes))) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    if events.send(ChannelEvent::Message(text)).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(
                        reason = ?frame.map(|f| f.reason.to_string()),
                        "peer closed websocket"
                    );
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    let _ = events.send(ChannelEvent::Error(ChannelError::Protocol(
                        err.to_string(),
                    )));
                    break;
                }
                None => break,
            },
        }
    }

    let _ = events.send(ChannelEvent::Closed);
}

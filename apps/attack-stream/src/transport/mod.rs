use async_trait::async_trait;
use thiserror::Error;

pub mod mock;
pub mod websocket;

pub use websocket::config::{Endpoint, EndpointError, DEFAULT_URL};
pub use websocket::WebSocketChannel;

/// Lifecycle and data events surfaced by a [`Channel`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The connection is established and can carry outbound frames.
    Opened,
    /// One inbound text frame.
    Message(String),
    /// Transport-level failure. A `Closed` event normally follows.
    Error(ChannelError),
    /// The connection ended, from either side.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("channel disconnected")]
    Disconnected,
}

/// Bidirectional, message-oriented connection owned by exactly one session.
#[async_trait]
pub trait Channel: Send {
    /// Queue one outbound text frame.
    async fn send(&mut self, text: String) -> Result<(), ChannelError>;

    /// Wait for the next event. `None` means the channel is exhausted and is
    /// treated the same as [`ChannelEvent::Closed`].
    async fn next_event(&mut self) -> Option<ChannelEvent>;
}

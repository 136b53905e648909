use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Channel, ChannelError, ChannelEvent};

/// In-memory [`Channel`] that replays a fixed event script and records every
/// outbound frame. Once the script runs out it reports exhaustion (`None`).
pub struct ScriptedChannel {
    script: VecDeque<ChannelEvent>,
    sent: Arc<Mutex<Vec<String>>>,
    send_error: Option<ChannelError>,
}

impl ScriptedChannel {
    pub fn new(script: impl IntoIterator<Item = ChannelEvent>) -> Self {
        Self {
            script: script.into_iter().collect(),
            sent: Arc::new(Mutex::new(Vec::new())),
            send_error: None,
        }
    }

    /// `Opened`, one `Message` per frame, then `Closed`.
    pub fn with_frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut script = vec![ChannelEvent::Opened];
        script.extend(frames.into_iter().map(|frame| ChannelEvent::Message(frame.into())));
        script.push(ChannelEvent::Closed);
        Self::new(script)
    }

    /// Makes every `send` fail with `error`.
    pub fn failing_sends(mut self, error: ChannelError) -> Self {
        self.send_error = Some(error);
        self
    }

    /// Handle to the outbound frames, usable after the channel is consumed.
    pub fn sent_frames(&self) -> Arc<Mutex<Vec<String>>> {
        self.sent.clone()
    }
}

#[async_trait]
impl Channel for ScriptedChannel {
    async fn send(&mut self, text: String) -> Result<(), ChannelError> {
        if let Some(error) = &self.send_error {
            return Err(error.clone());
        }
        self.sent.lock().push(text);
        Ok(())
    }

    async fn next_event(&mut self) -> Option<ChannelEvent> {
        self.script.pop_front()
    }
}

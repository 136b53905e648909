//! Output sinks receive the classified events of a session. The session calls
//! exactly one `show_*` method per inbound frame; `reset` is only used before
//! the connection is attempted.

mod memory;
mod terminal;

pub use memory::RecordingSink;
pub use terminal::TerminalSink;

use prediction_proto::PROCESSING_PLACEHOLDER;

/// Presentation surface for one session.
pub trait OutputSink: Send {
    /// Live output shows the in-progress placeholder, final output is cleared.
    fn reset(&mut self);
    fn show_interim(&mut self, text: &str);
    fn show_final(&mut self, text: &str);
    /// Replaces the live output; there is no separate error region.
    fn show_error(&mut self, text: &str);
}

/// The two display regions a sink maintains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputState {
    pub live: String,
    pub final_output: String,
}

impl OutputState {
    pub fn reset(&mut self) {
        self.live = PROCESSING_PLACEHOLDER.to_string();
        self.final_output.clear();
    }

    pub fn apply(&mut self, call: &SinkCall) {
        match call {
            SinkCall::Reset => self.reset(),
            SinkCall::Interim(text) | SinkCall::Error(text) => self.live = text.clone(),
            SinkCall::Final(text) => self.final_output = text.clone(),
        }
    }
}

/// One sink invocation, as recorded by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Reset,
    Interim(String),
    Final(String),
    Error(String),
}

impl SinkCall {
    /// `true` for the per-frame effects (everything except `Reset`).
    pub fn is_frame_effect(&self) -> bool {
        !matches!(self, SinkCall::Reset)
    }
}

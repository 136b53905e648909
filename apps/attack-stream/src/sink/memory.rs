use std::sync::Arc;

use parking_lot::Mutex;

use super::{OutputSink, OutputState, SinkCall};

#[derive(Debug, Default)]
struct Recorded {
    state: OutputState,
    calls: Vec<SinkCall>,
}

/// Sink that keeps the display state and a log of every call. Clones share
/// the same record, so a test can hand one clone to a session and inspect the
/// other afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OutputState {
        self.inner.lock().state.clone()
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.inner.lock().calls.clone()
    }

    /// Calls made in response to frames or transport failures.
    pub fn frame_effects(&self) -> Vec<SinkCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|call| call.is_frame_effect())
            .cloned()
            .collect()
    }

    pub fn interim_texts(&self) -> Vec<String> {
        self.collect(|call| match call {
            SinkCall::Interim(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn final_texts(&self) -> Vec<String> {
        self.collect(|call| match call {
            SinkCall::Final(text) => Some(text.clone()),
            _ => None,
        })
    }

    pub fn error_texts(&self) -> Vec<String> {
        self.collect(|call| match call {
            SinkCall::Error(text) => Some(text.clone()),
            _ => None,
        })
    }

    fn collect(&self, pick: impl Fn(&SinkCall) -> Option<String>) -> Vec<String> {
        self.inner.lock().calls.iter().filter_map(pick).collect()
    }

    fn record(&self, call: SinkCall) {
        let mut guard = self.inner.lock();
        guard.state.apply(&call);
        guard.calls.push(call);
    }
}

impl OutputSink for RecordingSink {
    fn reset(&mut self) {
        self.record(SinkCall::Reset);
    }

    fn show_interim(&mut self, text: &str) {
        self.record(SinkCall::Interim(text.to_string()));
    }

    fn show_final(&mut self, text: &str) {
        self.record(SinkCall::Final(text.to_string()));
    }

    fn show_error(&mut self, text: &str) {
        self.record(SinkCall::Error(text.to_string()));
    }
}

use std::io::{self, Write};

use tracing::warn;

use super::{OutputSink, OutputState, SinkCall};

/// Writes each update as a labelled line, e.g. `live  | 5-sec Batch Prediction: 0`.
pub struct TerminalSink<W: Write + Send> {
    writer: W,
    state: OutputState,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            state: OutputState::default(),
        }
    }

    pub fn state(&self) -> &OutputState {
        &self.state
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, call: SinkCall) {
        self.state.apply(&call);
        let line = match &call {
            SinkCall::Reset => format!("live  | {}", self.state.live),
            SinkCall::Interim(text) | SinkCall::Error(text) => format!("live  | {text}"),
            SinkCall::Final(text) => format!("final | {text}"),
        };
        if let Err(err) = writeln!(self.writer, "{line}").and_then(|_| self.writer.flush()) {
            warn!(error = %err, "failed to write session output");
        }
    }
}

impl<W: Write + Send> OutputSink for TerminalSink<W> {
    fn reset(&mut self) {
        self.emit(SinkCall::Reset);
    }

    fn show_interim(&mut self, text: &str) {
        self.emit(SinkCall::Interim(text.to_string()));
    }

    fn show_final(&mut self, text: &str) {
        self.emit(SinkCall::Final(text.to_string()));
    }

    fn show_error(&mut self, text: &str) {
        self.emit(SinkCall::Error(text.to_string()));
    }
}

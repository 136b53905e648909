//! Lifecycle of a single attack-prediction session.
//!
//! ```text
//! Idle --begin--> Connecting --Opened / send request--> Open --Message--> Open
//!                     |                                   |
//!                     +------- Error | Closed ------------+--> Closed (terminal)
//! ```
//!
//! [`StreamingSession`] is a synchronous state machine: it consumes
//! [`ChannelEvent`]s, drives an [`OutputSink`] and tells the caller when the
//! request frame has to go out. [`runner`] pairs it with a [`Channel`].
//!
//! [`Channel`]: crate::transport::Channel

use clap::ValueEnum;
use prediction_proto::{decode_frame, error_text, render_prediction, AttackRequest, Classified};
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::sink::OutputSink;
use crate::transport::ChannelEvent;

pub mod runner;

pub use runner::{drive, launch, run_session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

/// What to do with an inbound frame that is not a JSON object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MalformedFramePolicy {
    /// Report it through the sink as an error. The session stays open.
    #[default]
    Surface,
    /// Log and drop it.
    Ignore,
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub malformed: MalformedFramePolicy,
}

/// Work the caller must perform on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Send(String),
}

/// What a session observed over its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub session_id: Uuid,
    pub attack: String,
    pub state: SessionState,
    pub request_sent: bool,
    pub frames: u64,
    pub interim_updates: u64,
    pub final_updates: u64,
    pub application_errors: u64,
    pub malformed_frames: u64,
    pub transport_error: Option<String>,
    /// Rendered prediction of the most recent final frame.
    pub last_final: Option<String>,
}

impl SessionReport {
    pub fn received_final(&self) -> bool {
        self.final_updates > 0
    }

    /// One-line JSON summary.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

pub struct StreamingSession {
    id: Uuid,
    state: SessionState,
    config: SessionConfig,
    /// Taken when the request is handed out; `None` afterwards.
    request: Option<AttackRequest>,
    report: SessionReport,
}

impl StreamingSession {
    pub fn new(attack: impl Into<String>, config: SessionConfig) -> Self {
        let id = Uuid::new_v4();
        let request = AttackRequest::new(attack);
        let report = SessionReport {
            session_id: id,
            attack: request.attack.clone(),
            state: SessionState::Idle,
            request_sent: false,
            frames: 0,
            interim_updates: 0,
            final_updates: 0,
            application_errors: 0,
            malformed_frames: 0,
            transport_error: None,
            last_final: None,
        };
        Self {
            id,
            state: SessionState::Idle,
            config,
            request: Some(request),
            report,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn attack(&self) -> &str {
        &self.report.attack
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    pub fn report(&self) -> SessionReport {
        let mut report = self.report.clone();
        report.state = self.state;
        report
    }

    /// Resets the sink and moves to `Connecting`. Call before any network
    /// activity so the caller sees feedback immediately.
    pub fn begin(&mut self, sink: &mut dyn OutputSink) {
        if self.state != SessionState::Idle {
            warn!(session_id = %self.id, state = ?self.state, "session already started");
            return;
        }
        sink.reset();
        self.state = SessionState::Connecting;
        debug!(session_id = %self.id, attack = %self.report.attack, "session connecting");
    }

    /// Applies one channel event. Returns the request frame exactly once, on
    /// the transition to `Open`.
    pub fn on_event(&mut self, event: ChannelEvent, sink: &mut dyn OutputSink) -> Option<Outbound> {
        match (self.state, event) {
            (SessionState::Closed, event) => {
                trace!(session_id = %self.id, ?event, "event after close ignored");
                None
            }
            (_, ChannelEvent::Closed) => {
                info!(session_id = %self.id, "session closed");
                self.state = SessionState::Closed;
                None
            }
            (SessionState::Connecting, ChannelEvent::Opened) => {
                self.state = SessionState::Open;
                info!(session_id = %self.id, attack = %self.report.attack, "session open");
                let request = self.request.take()?;
                self.report.request_sent = true;
                Some(Outbound::Send(request.encode()))
            }
            (SessionState::Open, ChannelEvent::Message(text)) => {
                self.dispatch(&text, sink);
                None
            }
            (SessionState::Connecting | SessionState::Open, ChannelEvent::Error(err)) => {
                error!(session_id = %self.id, error = %err, "transport error");
                sink.show_error(&error_text(&err.to_string()));
                self.report.transport_error = Some(err.to_string());
                self.state = SessionState::Closed;
                None
            }
            (state, event) => {
                warn!(session_id = %self.id, ?state, ?event, "unexpected event ignored");
                None
            }
        }
    }

    fn dispatch(&mut self, text: &str, sink: &mut dyn OutputSink) {
        self.report.frames += 1;
        let frame = match decode_frame(text) {
            Ok(frame) => frame,
            Err(err) => {
                self.report.malformed_frames += 1;
                match self.config.malformed {
                    MalformedFramePolicy::Surface => {
                        warn!(session_id = %self.id, error = %err, "malformed frame");
                        sink.show_error(&error_text(&format!("malformed frame: {err}")));
                    }
                    MalformedFramePolicy::Ignore => {
                        warn!(session_id = %self.id, error = %err, "malformed frame dropped");
                    }
                }
                return;
            }
        };

        let classified = frame.classify();
        let display_text = classified.display_text();
        match &classified {
            Classified::Error(message) => {
                warn!(session_id = %self.id, error = %message, "backend reported error");
                self.report.application_errors += 1;
                sink.show_error(&display_text);
            }
            Classified::Interim(_) => {
                debug!(session_id = %self.id, text = %display_text, "interim prediction");
                self.report.interim_updates += 1;
                sink.show_interim(&display_text);
            }
            Classified::Final(prediction) => {
                info!(session_id = %self.id, text = %display_text, "final prediction");
                self.report.final_updates += 1;
                self.report.last_final = Some(render_prediction(prediction));
                sink.show_final(&display_text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{RecordingSink, SinkCall};
    use crate::transport::ChannelError;

    fn open_session(attack: &str, sink: &mut RecordingSink) -> StreamingSession {
        let mut session = StreamingSession::new(attack, SessionConfig::default());
        session.begin(&mut *sink);
        let outbound = session.on_event(ChannelEvent::Opened, &mut *sink);
        assert!(matches!(outbound, Some(Outbound::Send(_))));
        session
    }

    fn message(text: &str) -> ChannelEvent {
        ChannelEvent::Message(text.to_string())
    }

    #[test_timeout::timeout]
    fn begin_resets_sink_before_connecting() {
        let mut sink = RecordingSink::new();
        let mut session = StreamingSession::new("DoS", SessionConfig::default());
        assert_eq!(session.state(), SessionState::Idle);

        session.begin(&mut sink);

        assert_eq!(session.state(), SessionState::Connecting);
        assert_eq!(sink.calls(), vec![SinkCall::Reset]);
        assert_eq!(sink.state().live, "Processing...");
        assert_eq!(sink.state().final_output, "");
    }

    #[test_timeout::timeout]
    fn request_is_sent_once_on_open() {
        let mut sink = RecordingSink::new();
        let mut session = StreamingSession::new("ddos", SessionConfig::default());
        session.begin(&mut sink);

        let first = session.on_event(ChannelEvent::Opened, &mut sink);
        assert_eq!(first, Some(Outbound::Send(r#"{"attack":"ddos"}"#.to_string())));
        assert_eq!(session.state(), SessionState::Open);

        let second = session.on_event(ChannelEvent::Opened, &mut sink);
        assert_eq!(second, None);
        assert!(session.report().request_sent);
    }

    #[test_timeout::timeout]
    fn one_sink_effect_per_frame_by_precedence() {
        let mut sink = RecordingSink::new();
        let mut session = open_session("Fuzzy", &mut sink);

        session.on_event(message(r#"{"final": false, "prediction": 0.42}"#), &mut sink);
        session.on_event(message(r#"{"final": true, "prediction": "malware"}"#), &mut sink);
        session.on_event(
            message(r#"{"error": "model unavailable", "final": true, "prediction": 1}"#),
            &mut sink,
        );

        assert_eq!(
            sink.frame_effects(),
            vec![
                SinkCall::Interim("5-sec Batch Prediction: 0.42".into()),
                SinkCall::Final("Final Prediction (1 min): malware".into()),
                SinkCall::Error("Error: model unavailable".into()),
            ]
        );
        assert_eq!(session.state(), SessionState::Open);
    }

    #[test_timeout::timeout]
    fn application_error_keeps_session_open() {
        let mut sink = RecordingSink::new();
        let mut session = open_session("Nope", &mut sink);

        session.on_event(message(r#"{"error": "Invalid attack type"}"#), &mut sink);
        session.on_event(message(r#"{"final": false, "prediction": 0}"#), &mut sink);

        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(sink.error_texts(), vec!["Error: Invalid attack type"]);
        assert_eq!(sink.interim_texts().len(), 1);
        assert!(sink.final_texts().is_empty());
    }

    #[test_timeout::timeout]
    fn second_final_overwrites_first() {
        let mut sink = RecordingSink::new();
        let mut session = open_session("DoS", &mut sink);

        session.on_event(message(r#"{"final": true, "prediction": 0}"#), &mut sink);
        session.on_event(message(r#"{"final": true, "prediction": 1}"#), &mut sink);

        assert_eq!(sink.final_texts().len(), 2);
        assert_eq!(sink.state().final_output, "Final Prediction (1 min): 1");
        let report = session.report();
        assert_eq!(report.final_updates, 2);
        assert_eq!(report.last_final.as_deref(), Some("1"));
    }

    #[test_timeout::timeout]
    fn report_serializes_with_snake_case_state() {
        let mut sink = RecordingSink::new();
        let mut session = open_session("DoS", &mut sink);
        session.on_event(message(r#"{"final": true, "prediction": "DoS"}"#), &mut sink);
        session.on_event(ChannelEvent::Closed, &mut sink);

        let summary: serde_json::Value = serde_json::from_str(&session.report().to_json()).unwrap();
        assert_eq!(summary["state"], "closed");
        assert_eq!(summary["attack"], "DoS");
        assert_eq!(summary["final_updates"], 1);
        assert_eq!(summary["last_final"], "DoS");
    }

    #[test_timeout::timeout]
    fn transport_error_is_surfaced_and_closes() {
        let mut sink = RecordingSink::new();
        let mut session = open_session("DoS", &mut sink);

        session.on_event(
            ChannelEvent::Error(ChannelError::Protocol("connection reset".into())),
            &mut sink,
        );

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(
            sink.error_texts(),
            vec!["Error: protocol error: connection reset"]
        );
        assert_eq!(
            session.report().transport_error.as_deref(),
            Some("protocol error: connection reset")
        );
    }

    #[test_timeout::timeout]
    fn connect_failure_closes_without_sending() {
        let mut sink = RecordingSink::new();
        let mut session = StreamingSession::new("DoS", SessionConfig::default());
        session.begin(&mut sink);

        let outbound = session.on_event(
            ChannelEvent::Error(ChannelError::Connect("refused".into())),
            &mut sink,
        );

        assert_eq!(outbound, None);
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.report().request_sent);
        assert_eq!(sink.error_texts(), vec!["Error: connection failed: refused"]);
    }

    #[test_timeout::timeout]
    fn closed_session_is_inert() {
        let mut sink = RecordingSink::new();
        let mut session = open_session("DoS", &mut sink);
        session.on_event(ChannelEvent::Closed, &mut sink);
        let calls_at_close = sink.calls().len();

        session.on_event(message(r#"{"final": true, "prediction": 1}"#), &mut sink);
        session.on_event(ChannelEvent::Opened, &mut sink);
        session.on_event(
            ChannelEvent::Error(ChannelError::Disconnected),
            &mut sink,
        );

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(sink.calls().len(), calls_at_close);
    }

    #[test_timeout::timeout]
    fn close_produces_no_sink_call() {
        let mut sink = RecordingSink::new();
        let mut session = open_session("DoS", &mut sink);
        session.on_event(ChannelEvent::Closed, &mut sink);
        assert!(sink.frame_effects().is_empty());
    }

    #[test_timeout::timeout]
    fn message_before_open_is_ignored() {
        let mut sink = RecordingSink::new();
        let mut session = StreamingSession::new("DoS", SessionConfig::default());
        session.begin(&mut sink);

        session.on_event(message(r#"{"final": true, "prediction": 1}"#), &mut sink);

        assert_eq!(session.state(), SessionState::Connecting);
        assert!(sink.frame_effects().is_empty());
    }

    #[test_timeout::timeout]
    fn malformed_frame_policy() {
        let mut sink = RecordingSink::new();
        let mut session = open_session("DoS", &mut sink);
        session.on_event(message("not json"), &mut sink);
        assert_eq!(sink.error_texts().len(), 1);
        assert!(sink.error_texts()[0].starts_with("Error: malformed frame: "));
        assert_eq!(session.state(), SessionState::Open);

        let mut quiet = RecordingSink::new();
        let mut session = StreamingSession::new(
            "DoS",
            SessionConfig {
                malformed: MalformedFramePolicy::Ignore,
            },
        );
        session.begin(&mut quiet);
        session.on_event(ChannelEvent::Opened, &mut quiet);
        session.on_event(message("[1, 2, 3]"), &mut quiet);
        assert!(quiet.frame_effects().is_empty());
        assert_eq!(session.report().malformed_frames, 1);
    }
}

use tracing::{info_span, warn, Instrument};

use super::{Outbound, SessionConfig, SessionReport, SessionState, StreamingSession};
use crate::sink::OutputSink;
use crate::transport::{Channel, ChannelEvent, Endpoint, WebSocketChannel};

/// Pumps events from `channel` into `session` until it closes. Starts the
/// session first if the caller has not. Never fails: problems end up in the
/// sink and the returned report.
pub async fn drive<C>(
    mut session: StreamingSession,
    channel: &mut C,
    sink: &mut dyn OutputSink,
) -> SessionReport
where
    C: Channel + ?Sized,
{
    let span = info_span!("session", session_id = %session.id(), attack = %session.attack());
    async move {
        if session.state() == SessionState::Idle {
            session.begin(sink);
        }
        while !session.is_closed() {
            let event = channel.next_event().await.unwrap_or(ChannelEvent::Closed);
            if let Some(Outbound::Send(frame)) = session.on_event(event, sink) {
                if let Err(err) = channel.send(frame).await {
                    warn!(error = %err, "request frame could not be sent");
                    session.on_event(ChannelEvent::Error(err), sink);
                }
            }
        }
        session.report()
    }
    .instrument(span)
    .await
}

/// Runs a fresh session for `attack` over an already constructed channel.
pub async fn run_session<C>(
    channel: &mut C,
    sink: &mut dyn OutputSink,
    attack: impl Into<String>,
    config: SessionConfig,
) -> SessionReport
where
    C: Channel + ?Sized,
{
    drive(StreamingSession::new(attack, config), channel, sink).await
}

/// Resets the sink, opens a new WebSocket to `endpoint` and streams
/// predictions for `attack` until the peer hangs up. Each call uses its own
/// connection and shares nothing with earlier calls.
pub async fn launch(
    endpoint: &Endpoint,
    attack: impl Into<String>,
    sink: &mut dyn OutputSink,
    config: SessionConfig,
) -> SessionReport {
    let mut session = StreamingSession::new(attack, config);
    session.begin(sink);
    let mut channel = WebSocketChannel::open(endpoint.clone());
    let report = drive(session, &mut channel, sink).await;
    channel.close().await;
    report
}

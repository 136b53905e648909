//! Frames exchanged with the prediction backend over the attack-stream
//! WebSocket. The client sends a single [`AttackRequest`] once the socket is
//! open and then receives any number of [`ResponseFrame`]s until the peer
//! hangs up. Keeping the shapes here lets the CLI, tests and any future
//! front-ends agree on the wire format and on the text shown to users.

mod frame;
mod request;

pub use frame::{decode_frame, render_prediction, Classified, DecodeError, ResponseFrame};
pub use request::AttackRequest;

/// Prefix for periodic (non-final) prediction updates.
pub const INTERIM_PREFIX: &str = "5-sec Batch Prediction: ";
/// Prefix for the end-of-window prediction.
pub const FINAL_PREFIX: &str = "Final Prediction (1 min): ";
/// Prefix for errors reported in place of the live output.
pub const ERROR_PREFIX: &str = "Error: ";
/// Live output shown while the connection is still being established.
pub const PROCESSING_PLACEHOLDER: &str = "Processing...";

/// Attack identifiers understood by the reference backend. The client never
/// validates against this list; an unknown identifier is reported back by the
/// backend as an error frame.
pub const KNOWN_ATTACKS: &[&str] = &["Attack-Free", "DoS", "Fuzzy", "Impersonation"];

/// Formats an application or transport error the way it is displayed.
pub fn error_text(message: &str) -> String {
    format!("{ERROR_PREFIX}{message}")
}

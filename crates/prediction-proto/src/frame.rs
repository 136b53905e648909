use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{error_text, FINAL_PREFIX, INTERIM_PREFIX};

/// Inbound frame as sent by the backend. All fields are optional on the wire;
/// [`ResponseFrame::classify`] decides what the frame means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, rename = "final", skip_serializing_if = "Option::is_none")]
    pub is_final: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Value>,
}

/// Meaning of a decoded frame. A frame maps to exactly one variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Error(String),
    Interim(Value),
    Final(Value),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a json object, got {0}")]
    NotAnObject(&'static str),
}

impl ResponseFrame {
    pub fn interim(prediction: impl Into<Value>) -> Self {
        Self {
            error: None,
            is_final: Some(Value::Bool(false)),
            prediction: Some(prediction.into()),
        }
    }

    pub fn final_result(prediction: impl Into<Value>) -> Self {
        Self {
            error: None,
            is_final: Some(Value::Bool(true)),
            prediction: Some(prediction.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(Value::String(message.into())),
            ..Self::default()
        }
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Error message carried by the frame, if the `error` field is truthy.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref().filter(|value| is_truthy(value))? {
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Any truthy `final` marks a final frame.
    pub fn is_final(&self) -> bool {
        self.is_final.as_ref().is_some_and(is_truthy)
    }

    /// Precedence is error > final > interim.
    pub fn classify(&self) -> Classified {
        if let Some(message) = self.error_message() {
            return Classified::Error(message);
        }
        let prediction = self.prediction.clone().unwrap_or(Value::Null);
        if self.is_final() {
            Classified::Final(prediction)
        } else {
            Classified::Interim(prediction)
        }
    }
}

impl Classified {
    /// Text handed to the output sink for this frame.
    pub fn display_text(&self) -> String {
        match self {
            Classified::Error(message) => error_text(message),
            Classified::Interim(prediction) => {
                format!("{INTERIM_PREFIX}{}", render_prediction(prediction))
            }
            Classified::Final(prediction) => {
                format!("{FINAL_PREFIX}{}", render_prediction(prediction))
            }
        }
    }
}

/// Strings are shown bare, everything else as compact JSON.
pub fn render_prediction(prediction: &Value) -> String {
    match prediction {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn decode_frame(text: &str) -> Result<ResponseFrame, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(DecodeError::NotAnObject(json_kind(&value)));
    }
    Ok(serde_json::from_value(value)?)
}

/// Falsy values are `null`, `false`, zero and the empty string. Arrays and
/// objects are truthy even when empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

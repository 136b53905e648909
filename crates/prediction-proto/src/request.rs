use serde::{Deserialize, Serialize};

/// The one frame a client sends per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRequest {
    pub attack: String,
}

impl AttackRequest {
    pub fn new(attack: impl Into<String>) -> Self {
        Self {
            attack: attack.into(),
        }
    }

    pub fn encode(&self) -> String {
        serde_json::json!({ "attack": self.attack }).to_string()
    }
}

//! Request and reply shapes exchanged with the upstream

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body sent to both upstream endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Clarify endpoint reply, read leniently
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClarifyReply {
    pub clarification_needed: bool,
    pub clarification: String,
}

impl ClarifyReply {
    /// Only a literal `true` counts as needing clarification.
    pub fn from_value(value: &Value) -> Self {
        Self {
            clarification_needed: value.get("clarification_needed") == Some(&Value::Bool(true)),
            clarification: value
                .get("clarification")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }

    pub fn needed(question: impl Into<String>) -> Self {
        Self {
            clarification_needed: true,
            clarification: question.into(),
        }
    }

    pub fn not_needed() -> Self {
        Self::default()
    }
}

/// Chat endpoint reply
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: Option<String>,
}

impl ChatReply {
    pub fn from_value(value: &Value) -> Self {
        let response = match value.get("response") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        };
        Self { response }
    }

    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }
}

//! Effects produced by state transitions

use super::Role;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a message to the conversation
    RecordMessage { role: Role, content: String },

    /// Ask the clarify endpoint about `message`
    RequestClarification { turn: u64, message: String },

    /// Send `message` to the chat endpoint
    RequestChat { turn: u64, message: String },

    /// Drop every message
    ClearMessages,

    /// Abort the outstanding call
    CancelInFlight,
}

impl Effect {
    pub fn record_user(content: impl Into<String>) -> Self {
        Effect::RecordMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn record_assistant(content: impl Into<String>) -> Self {
        Effect::RecordMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Whether this effect issues a network call
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            Effect::RequestClarification { .. } | Effect::RequestChat { .. }
        )
    }
}

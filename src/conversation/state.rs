//! Conversation state types

use crate::i18n::{Catalog, Language};
use serde::{Deserialize, Serialize};

/// A clarification question still waiting for the user's answer.
///
/// The question and the message that prompted it only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClarification {
    pub question: String,
    pub original_message: String,
}

/// Conversation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// Ready for a fresh request
    #[default]
    Idle,

    /// Clarify call in flight for a fresh request
    Clarifying { turn: u64, message: String },

    /// Chat call in flight
    Generating {
        turn: u64,
        /// Set when this call carries the answer to a clarification
        #[serde(default)]
        answering: Option<PendingClarification>,
    },

    /// Backend asked a question; the next submission answers it
    AwaitingClarification { pending: PendingClarification },
}

/// The two user-visible phases of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingClarification,
}

impl ConvState {
    /// True while a network call is outstanding; new submissions are refused
    pub fn is_awaiting_reply(&self) -> bool {
        matches!(self, ConvState::Clarifying { .. } | ConvState::Generating { .. })
    }

    /// Turn of the outstanding call, if any
    pub fn in_flight_turn(&self) -> Option<u64> {
        match self {
            ConvState::Clarifying { turn, .. } | ConvState::Generating { turn, .. } => Some(*turn),
            ConvState::Idle | ConvState::AwaitingClarification { .. } => None,
        }
    }

    pub fn pending_clarification(&self) -> Option<&PendingClarification> {
        match self {
            ConvState::AwaitingClarification { pending }
            | ConvState::Generating {
                answering: Some(pending),
                ..
            } => Some(pending),
            _ => None,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.pending_clarification().is_some() {
            Phase::AwaitingClarification
        } else {
            Phase::Idle
        }
    }
}

/// Per-conversation configuration, fixed at creation
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub conversation_id: String,
    pub language: Language,
    /// Assistant notice appended when a call fails
    pub server_error_notice: String,
    /// Assistant notice appended when the user cancels a call
    pub cancelled_notice: String,
}

impl ConvContext {
    pub fn new(conversation_id: impl Into<String>, language: Language, catalog: &Catalog) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            language,
            server_error_notice: catalog.text(language, "serverError").to_string(),
            cancelled_notice: catalog.text(language, "requestCancelled").to_string(),
        }
    }
}

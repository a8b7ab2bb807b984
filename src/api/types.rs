//! API request and response types

use crate::i18n::Language;
use crate::runtime::ConversationView;
use serde::{Deserialize, Serialize};

/// Request to create a new conversation
#[derive(Debug, Default, Deserialize)]
pub struct CreateConversationRequest {
    /// Defaults to the gateway's configured language
    #[serde(default)]
    pub language: Option<Language>,
}

/// Request to submit a message
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

/// Response with a single conversation
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation: ConversationView,
}

/// Response for cancel action
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

// ============================================================
// Proxy fallbacks
// ============================================================

/// Body of a failed `POST /api/chat-proxy`
#[derive(Debug, Serialize)]
pub struct ChatFallback {
    pub response: String,
    pub error: String,
}

/// Body of a failed `GET /api/chat-proxy`
#[derive(Debug, Serialize)]
pub struct HealthFallback {
    pub message: String,
    pub error: String,
}

/// Body of a failed `POST /api/clarify-proxy`
#[derive(Debug, Serialize)]
pub struct ClarifyFallback {
    pub clarification_needed: bool,
    pub clarification: String,
    pub error: String,
}

impl ClarifyFallback {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            clarification_needed: false,
            clarification: String::new(),
            error: error.into(),
        }
    }
}

//! HTTP request handlers

use super::types::{
    CancelResponse, ChatFallback, ClarifyFallback, ConversationResponse,
    CreateConversationRequest, ErrorResponse, HealthFallback, SubmitRequest, SuccessResponse,
};
use super::AppState;
use crate::conversation::TransitionError;
use crate::i18n::Language;
use crate::proxy::ProxyError;
use crate::runtime::ProductionController;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Proxy relay
        .route("/api/chat-proxy", post(chat_proxy).get(health_proxy))
        .route("/api/chat-proxy/", get(health_proxy))
        .route("/api/clarify-proxy", post(clarify_proxy))
        // Hosted conversations
        .route("/api/conversations", post(create_conversation))
        .route(
            "/api/conversations/:id",
            get(get_conversation).delete(delete_conversation),
        )
        .route("/api/conversations/:id/messages", post(submit_message))
        .route("/api/conversations/:id/cancel", post(cancel_conversation))
        .route("/api/conversations/:id/reset", post(reset_conversation))
        // Translations
        .route("/api/i18n/:lang", get(get_translations))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Proxy Relay
// ============================================================

async fn chat_proxy(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match parse_body(&body) {
        Ok(body) => state.upstream.forward_chat(&body).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            tracing::error!(route = "/api/chat-proxy", error = %e, "Chat proxy failed");
            let fallback = ChatFallback {
                response: state
                    .catalog
                    .text(state.language, "proxyChatFallback")
                    .to_string(),
                error: e.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(fallback)).into_response()
        }
    }
}

async fn clarify_proxy(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match parse_body(&body) {
        Ok(body) => state.upstream.forward_clarify(&body).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            tracing::error!(route = "/api/clarify-proxy", error = %e, "Clarify proxy failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ClarifyFallback::new(e.to_string())),
            )
                .into_response()
        }
    }
}

async fn health_proxy(State(state): State<AppState>) -> Response {
    match state.upstream.health().await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            tracing::error!(route = "/api/chat-proxy", error = %e, "Health check failed");
            let fallback = HealthFallback {
                message: state
                    .catalog
                    .text(state.language, "proxyHealthFallback")
                    .to_string(),
                error: e.to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(fallback)).into_response()
        }
    }
}

/// Inbound bodies are relayed as-is but must at least be JSON
fn parse_body(body: &[u8]) -> Result<Value, ProxyError> {
    serde_json::from_slice(body)
        .map_err(|e| ProxyError::invalid_body(format!("Invalid JSON body: {e}")))
}

// ============================================================
// Hosted Conversations
// ============================================================

async fn create_conversation(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ConversationResponse>, AppError> {
    let req: CreateConversationRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateConversationRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };

    let controller = state
        .sessions
        .create(req.language.unwrap_or(state.language))
        .await;

    Ok(Json(ConversationResponse {
        conversation: controller.view().await,
    }))
}

async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>, AppError> {
    let controller = find(&state, &id).await?;
    Ok(Json(ConversationResponse {
        conversation: controller.view().await,
    }))
}

async fn submit_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ConversationResponse>, AppError> {
    let controller = find(&state, &id).await?;
    let req: SubmitRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?;
    let conversation = controller.submit(req.text).await?;
    Ok(Json(ConversationResponse { conversation }))
}

async fn cancel_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>, AppError> {
    let controller = find(&state, &id).await?;
    Ok(Json(CancelResponse {
        cancelled: controller.cancel().await,
    }))
}

async fn reset_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>, AppError> {
    let controller = find(&state, &id).await?;
    Ok(Json(ConversationResponse {
        conversation: controller.reset().await,
    }))
}

async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.remove(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Conversation not found: {id}")))
    }
}

async fn find(state: &AppState, id: &str) -> Result<Arc<ProductionController>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Conversation not found: {id}")))
}

// ============================================================
// Translations
// ============================================================

async fn get_translations(
    State(state): State<AppState>,
    Path(lang): Path<String>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let language: Language = lang
        .parse()
        .map_err(|e: crate::i18n::I18nError| AppError::NotFound(e.to_string()))?;
    Ok(Json(state.catalog.table(language)))
}

async fn get_version() -> &'static str {
    concat!("edumind-gateway ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl From<TransitionError> for AppError {
    fn from(e: TransitionError) -> Self {
        match e {
            TransitionError::EmptyMessage => AppError::BadRequest(e.to_string()),
            TransitionError::Busy => AppError::Conflict(e.to_string()),
            TransitionError::StaleReply => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

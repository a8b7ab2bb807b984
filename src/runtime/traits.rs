//! Trait abstractions for runtime I/O
//!
//! The controller only sees `ProxyBackend`, so tests can swap in mocks.

use crate::proxy::{ChatReply, ClarifyReply, MessageBody, ProxyError, UpstreamClient};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// The two endpoints a conversation talks to, plus a liveness check
#[async_trait]
pub trait ProxyBackend: Send + Sync {
    /// Ask whether `message` needs clarifying before generation
    async fn clarify(&self, message: &str) -> Result<ClarifyReply, ProxyError>;

    /// Generate a reply for `message`
    async fn chat(&self, message: &str) -> Result<ChatReply, ProxyError>;

    /// Succeeds when the backend is reachable
    async fn health(&self) -> Result<(), ProxyError>;
}

#[async_trait]
impl<T: ProxyBackend + ?Sized> ProxyBackend for Arc<T> {
    async fn clarify(&self, message: &str) -> Result<ClarifyReply, ProxyError> {
        (**self).clarify(message).await
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, ProxyError> {
        (**self).chat(message).await
    }

    async fn health(&self) -> Result<(), ProxyError> {
        (**self).health().await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

fn message_body(message: &str) -> Result<Value, ProxyError> {
    serde_json::to_value(MessageBody::new(message))
        .map_err(|e| ProxyError::invalid_body(e.to_string()))
}

#[async_trait]
impl ProxyBackend for UpstreamClient {
    async fn clarify(&self, message: &str) -> Result<ClarifyReply, ProxyError> {
        let reply = self.forward_clarify(&message_body(message)?).await?;
        Ok(ClarifyReply::from_value(&reply))
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, ProxyError> {
        let reply = self.forward_chat(&message_body(message)?).await?;
        Ok(ChatReply::from_value(&reply))
    }

    async fn health(&self) -> Result<(), ProxyError> {
        UpstreamClient::health(self).await.map(|_| ())
    }
}

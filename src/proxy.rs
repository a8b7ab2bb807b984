//! Upstream relay
//!
//! Forwards JSON bodies to the AI backend's chat and clarify endpoints and
//! hands back whatever JSON it answers with. No retries.

mod error;
mod types;

#[cfg(test)]
pub(crate) mod stub;

pub use error::{ProxyError, ProxyErrorKind};
pub use types::{ChatReply, ClarifyReply, MessageBody};

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Paths of the three endpoints a relay target exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routes {
    pub chat: &'static str,
    pub clarify: &'static str,
    pub health: &'static str,
}

impl Routes {
    /// The AI backend itself
    pub const UPSTREAM: Routes = Routes {
        chat: "/api/chat",
        clarify: "/api/clarify",
        health: "/",
    };

    /// This gateway's own proxy routes, for clients talking to a running gateway
    pub const GATEWAY: Routes = Routes {
        chat: "/api/chat-proxy",
        clarify: "/api/clarify-proxy",
        health: "/api/chat-proxy/",
    };
}

/// HTTP client for a JSON relay target
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
    routes: Routes,
}

impl UpstreamClient {
    pub fn new(
        base_url: &str,
        timeout: Option<Duration>,
        routes: Routes,
    ) -> Result<Self, ProxyError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProxyError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            routes,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to the chat endpoint
    pub async fn forward_chat(&self, body: &Value) -> Result<Value, ProxyError> {
        let url = self.url(self.routes.chat);
        self.send(self.client.post(url).json(body), "chat").await
    }

    /// POST `body` to the clarify endpoint
    pub async fn forward_clarify(&self, body: &Value) -> Result<Value, ProxyError> {
        let url = self.url(self.routes.clarify);
        self.send(self.client.post(url).json(body), "clarify").await
    }

    /// GET the health endpoint
    pub async fn health(&self) -> Result<Value, ProxyError> {
        let url = self.url(self.routes.health);
        self.send(self.client.get(url), "health").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, endpoint: &'static str) -> Result<Value, ProxyError> {
        let start = Instant::now();
        let result = Self::execute(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(_) => tracing::debug!(
                endpoint,
                base_url = %self.base_url,
                duration_ms = %duration.as_millis(),
                "Upstream request completed"
            ),
            Err(e) => tracing::debug!(
                endpoint,
                base_url = %self.base_url,
                duration_ms = %duration.as_millis(),
                kind = ?e.kind,
                error = %e.message,
                "Upstream request failed"
            ),
        }

        result
    }

    async fn execute(request: RequestBuilder) -> Result<Value, ProxyError> {
        let response = request
            .send()
            .await
            .map_err(|e| ProxyError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::from_transport(&e))?;

        serde_json::from_slice(&body)
            .map_err(|e| ProxyError::decode(format!("Failed to parse response: {e}")))
    }
}

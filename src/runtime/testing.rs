//! Mock implementations for testing
//!
//! These mocks enable controller tests without real I/O.

use super::traits::ProxyBackend;
use crate::proxy::{ChatReply, ClarifyReply, ProxyError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// A call the controller made against the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Clarify(String),
    Chat(String),
}

/// Mock backend that answers from queued replies
pub struct MockBackend {
    clarify_replies: Mutex<VecDeque<Result<ClarifyReply, ProxyError>>>,
    chat_replies: Mutex<VecDeque<Result<ChatReply, ProxyError>>>,
    healthy: AtomicBool,
    delay: Option<Duration>,
    /// Record of all calls made
    pub calls: Mutex<Vec<BackendCall>>,
    /// Notified when a clarify or chat call starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

#[allow(dead_code)]
impl MockBackend {
    pub fn new() -> Self {
        Self {
            clarify_replies: Mutex::new(VecDeque::new()),
            chat_replies: Mutex::new(VecDeque::new()),
            healthy: AtomicBool::new(true),
            delay: None,
            calls: Mutex::new(Vec::new()),
            request_started: Arc::new(Notify::new()),
        }
    }

    /// Hold every clarify/chat reply back by `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_clarify(&self, reply: ClarifyReply) {
        self.clarify_replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn queue_clarify_error(&self, error: ProxyError) {
        self.clarify_replies.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_chat(&self, reply: ChatReply) {
        self.chat_replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn queue_chat_error(&self, error: ProxyError) {
        self.chat_replies.lock().unwrap().push_back(Err(error));
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn recorded_calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn chat_calls(&self) -> Vec<String> {
        self.recorded_calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Chat(message) => Some(message),
                BackendCall::Clarify(_) => None,
            })
            .collect()
    }

    async fn start(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
        self.request_started.notify_one();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProxyBackend for MockBackend {
    async fn clarify(&self, message: &str) -> Result<ClarifyReply, ProxyError> {
        self.start(BackendCall::Clarify(message.to_string())).await;
        self.clarify_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProxyError::network("No mock clarify reply queued")))
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, ProxyError> {
        self.start(BackendCall::Chat(message.to_string())).await;
        self.chat_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProxyError::network("No mock chat reply queued")))
    }

    async fn health(&self) -> Result<(), ProxyError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProxyError::status(502))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_replays_queue() {
        let mock = MockBackend::new();
        mock.queue_clarify(ClarifyReply::needed("Which grade?"));
        mock.queue_chat(ChatReply::text("Exam"));

        assert!(mock.clarify("a").await.unwrap().clarification_needed);
        assert_eq!(mock.chat("b").await.unwrap().response.as_deref(), Some("Exam"));

        // Queues are exhausted now
        assert!(mock.clarify("c").await.is_err());
        assert!(mock.chat("d").await.is_err());

        assert_eq!(
            mock.recorded_calls(),
            vec![
                BackendCall::Clarify("a".to_string()),
                BackendCall::Chat("b".to_string()),
                BackendCall::Clarify("c".to_string()),
                BackendCall::Chat("d".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_mock_backend_health_toggle() {
        let mock = MockBackend::new();
        assert!(mock.health().await.is_ok());
        mock.set_healthy(false);
        assert!(mock.health().await.is_err());
    }
}

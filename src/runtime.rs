//! Runtime for executing conversations
//!
//! Each conversation is a [`ConversationController`] owned by the
//! [`SessionManager`]. Controllers share one backend.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{ConversationController, ConversationView};
pub use traits::*;

use crate::conversation::ConvContext;
use crate::i18n::{Catalog, Language};
use crate::proxy::UpstreamClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Controller wired to the real upstream
pub type ProductionController = ConversationController<UpstreamClient>;

/// Manager for all live conversations
pub struct SessionManager<B: ProxyBackend + 'static> {
    backend: Arc<B>,
    catalog: Arc<Catalog>,
    request_timeout: Option<Duration>,
    sessions: RwLock<HashMap<String, Arc<ConversationController<B>>>>,
}

impl<B: ProxyBackend + 'static> SessionManager<B> {
    pub fn new(backend: Arc<B>, catalog: Arc<Catalog>, request_timeout: Option<Duration>) -> Self {
        Self {
            backend,
            catalog,
            request_timeout,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a new empty conversation
    pub async fn create(&self, language: Language) -> Arc<ConversationController<B>> {
        let id = uuid::Uuid::new_v4().to_string();
        let context = ConvContext::new(&id, language, &self.catalog);
        let controller = Arc::new(ConversationController::new(
            context,
            self.backend.clone(),
            self.request_timeout,
        ));

        self.sessions
            .write()
            .await
            .insert(id.clone(), controller.clone());
        tracing::info!(conv_id = %id, %language, "Created conversation");
        controller
    }

    pub async fn get(&self, id: &str) -> Option<Arc<ConversationController<B>>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Forget a conversation, aborting its outstanding call
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(controller) => {
                controller.cancel().await;
                tracing::info!(conv_id = %id, "Removed conversation");
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

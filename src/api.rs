//! HTTP API for the EduMind gateway
//!
//! Proxy routes relay to the AI backend; session routes host conversations
//! on the server.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::i18n::{Catalog, Language};
use crate::proxy::UpstreamClient;
use crate::runtime::SessionManager;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<UpstreamClient>,
    pub sessions: Arc<SessionManager<UpstreamClient>>,
    pub catalog: Arc<Catalog>,
    /// Language of proxy fallbacks and of sessions created without one
    pub language: Language,
}

impl AppState {
    pub fn new(
        upstream: UpstreamClient,
        catalog: Catalog,
        language: Language,
        request_timeout: Option<Duration>,
    ) -> Self {
        let upstream = Arc::new(upstream);
        let catalog = Arc::new(catalog);
        Self {
            sessions: Arc::new(SessionManager::new(
                upstream.clone(),
                catalog.clone(),
                request_timeout,
            )),
            upstream,
            catalog,
            language,
        }
    }
}

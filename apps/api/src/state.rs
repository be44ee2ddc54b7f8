use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionProvider;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Completion provider. `GeminiClient` in production, scripted in tests.
    pub llm: Arc<dyn CompletionProvider>,
    pub sessions: SessionStore,
    pub config: Config,
}

use std::sync::Arc;

use crate::config::Config;
use crate::interview::store::SessionStore;
use crate::llm_client::CompletionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// In-memory interview sessions. Emptied on shutdown.
    pub store: SessionStore,
    /// Question and feedback generation. `LlmClient` in production.
    pub completions: Arc<dyn CompletionService>,
    pub config: Config,
}

use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ContentGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model backend. Gemini in production, stubbed in tests.
    pub generator: Arc<dyn ContentGenerator>,
    pub config: Config,
}

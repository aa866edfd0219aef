use std::sync::Arc;

use crate::jobs::store::JobRepository;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable job storage. Default: InMemoryJobStore.
    pub jobs: Arc<dyn JobRepository>,
    pub llm: LlmClient,
}

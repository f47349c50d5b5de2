use std::sync::Arc;

use crate::llm_client::ChatCompletion;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Ownership checks and result write-back for resumes and certificates.
    pub store: Arc<dyn RecordStore>,
    /// Production: `LlmClient`. Tests swap in a fake.
    pub llm: Arc<dyn ChatCompletion>,
}

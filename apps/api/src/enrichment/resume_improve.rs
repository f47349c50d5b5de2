//! Resume improvement — rewrites resume content, returning the same structure.

use serde_json::{Map, Value};

use crate::enrichment::normalizer::parse_object;
use crate::enrichment::prompts::EnrichmentTask;
use crate::llm_client::{ChatCompletion, LlmError};

/// Returns whatever object the provider produced; no fields are required because
/// the expected shape is the caller's own.
pub async fn improve_resume(
    resume: &Map<String, Value>,
    llm: &dyn ChatCompletion,
) -> Result<Map<String, Value>, LlmError> {
    let task = EnrichmentTask::ImproveResume(resume);
    let raw = llm.complete(&task.messages(), &task.options()).await?;
    parse_object(task.name(), &raw, &[])
}

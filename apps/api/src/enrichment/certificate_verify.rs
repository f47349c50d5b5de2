//! Certificate verification — authenticity assessment of certificate text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enrichment::normalizer::parse_object;
use crate::enrichment::prompts::EnrichmentTask;
use crate::llm_client::{ChatCompletion, LlmError};

const TASK: &str = "certificate-verify";
const REQUIRED_FIELDS: &[&str] = &["status", "confidence"];
const VERIFIED: &str = "verified";

/// Provider verdict on a certificate, kept exactly as the provider sent it.
///
/// Only the presence of `status` and `confidence` is checked; their values and
/// any extra fields pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateAnalysis(Map<String, Value>);

impl CertificateAnalysis {
    pub fn new(object: Map<String, Value>) -> Self {
        Self(object)
    }

    /// The field's value, or `null` when the provider left it out.
    pub fn field(&self, name: &str) -> Value {
        self.0.get(name).cloned().unwrap_or(Value::Null)
    }

    /// `status` as stored on the certificate record.
    pub fn status(&self) -> String {
        self.text("status")
    }

    /// Only an exact `"verified"` marks the certificate verified.
    pub fn is_verified(&self) -> bool {
        self.0.get("status").and_then(Value::as_str) == Some(VERIFIED)
    }

    /// Strings render bare; other values render as JSON.
    pub fn text(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

pub async fn verify_certificate(
    document_text: &str,
    llm: &dyn ChatCompletion,
) -> Result<CertificateAnalysis, LlmError> {
    let task = EnrichmentTask::VerifyCertificate(document_text);
    let raw = llm.complete(&task.messages(), &task.options()).await?;
    let object = parse_object(TASK, &raw, REQUIRED_FIELDS)?;
    Ok(CertificateAnalysis::new(object))
}

//! In-crate fakes shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::enrichment::ats_score::AtsResult;
use crate::enrichment::certificate_verify::CertificateAnalysis;
use crate::errors::AppError;
use crate::llm_client::{ChatCompletion, ChatMessage, CompletionOptions, LlmError};
use crate::models::certificate::CertificateRow;
use crate::models::resume::ResumeRow;
use crate::store::{certificate_verification_details, resume_ats_analysis, RecordStore};

type Responder =
    Box<dyn Fn(&[ChatMessage], &CompletionOptions) -> Result<String, LlmError> + Send + Sync>;

/// A `ChatCompletion` that answers from a closure and records every call.
pub struct FakeCompletion {
    responder: Responder,
    calls: Mutex<Vec<(Vec<ChatMessage>, CompletionOptions)>>,
}

impl FakeCompletion {
    pub fn with(
        responder: impl Fn(&[ChatMessage], &CompletionOptions) -> Result<String, LlmError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::with(move |_, _| Ok(text.clone()))
    }

    pub fn calls(&self) -> Vec<(Vec<ChatMessage>, CompletionOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatCompletion for FakeCompletion {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), options.clone()));
        tokio::task::yield_now().await;
        (self.responder)(messages, options)
    }
}

/// `RecordStore` over plain maps.
#[derive(Default)]
pub struct MemoryStore {
    pub resumes: Mutex<HashMap<Uuid, ResumeRow>>,
    pub certificates: Mutex<HashMap<Uuid, CertificateRow>>,
}

impl MemoryStore {
    pub fn insert_resume(&self, user_id: &str) -> Uuid {
        let now = Utc::now();
        let row = ResumeRow {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            title: "My Resume".to_string(),
            ats_score: None,
            ats_analysis: None,
            created_at: now,
            updated_at: now,
        };
        let id = row.id;
        self.resumes.lock().unwrap().insert(id, row);
        id
    }

    pub fn insert_certificate(&self, user_id: &str) -> Uuid {
        let now = Utc::now();
        let row = CertificateRow {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            name: "Certified Kubernetes Administrator".to_string(),
            issuing_organization: "CNCF".to_string(),
            is_verified: false,
            verification_status: "pending".to_string(),
            verification_details: None,
            created_at: now,
            updated_at: now,
        };
        let id = row.id;
        self.certificates.lock().unwrap().insert(id, row);
        id
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_resume(
        &self,
        user_id: &str,
        resume_id: Uuid,
    ) -> Result<Option<ResumeRow>, AppError> {
        Ok(self
            .resumes
            .lock()
            .unwrap()
            .get(&resume_id)
            .filter(|r| r.user_id == user_id)
            .cloned())
    }

    async fn save_ats_result(&self, resume_id: Uuid, result: &AtsResult) -> Result<(), AppError> {
        let mut resumes = self.resumes.lock().unwrap();
        let row = resumes
            .get_mut(&resume_id)
            .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
        row.ats_score = Some(i32::from(result.score));
        row.ats_analysis = Some(resume_ats_analysis(result, Utc::now()));
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn find_certificate(
        &self,
        user_id: &str,
        certificate_id: Uuid,
    ) -> Result<Option<CertificateRow>, AppError> {
        Ok(self
            .certificates
            .lock()
            .unwrap()
            .get(&certificate_id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn save_certificate_verification(
        &self,
        certificate_id: Uuid,
        analysis: &CertificateAnalysis,
    ) -> Result<CertificateRow, AppError> {
        let mut certificates = self.certificates.lock().unwrap();
        let row = certificates
            .get_mut(&certificate_id)
            .ok_or_else(|| AppError::NotFound(format!("Certificate {certificate_id} not found")))?;
        row.is_verified = analysis.is_verified();
        row.verification_status = analysis.status();
        row.verification_details = Some(certificate_verification_details(analysis, Utc::now()));
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

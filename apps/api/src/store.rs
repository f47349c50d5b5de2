//! Record store seam for the AI endpoints.
//!
//! Only ownership lookups and result write-back live here; general resume and
//! certificate CRUD belongs to the record service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::enrichment::ats_score::AtsResult;
use crate::enrichment::certificate_verify::CertificateAnalysis;
use crate::errors::AppError;
use crate::models::certificate::CertificateRow;
use crate::models::resume::ResumeRow;

/// Carried in `AppState` as `Arc<dyn RecordStore>`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the resume only if `user_id` owns it.
    async fn find_resume(&self, user_id: &str, resume_id: Uuid)
        -> Result<Option<ResumeRow>, AppError>;

    async fn save_ats_result(&self, resume_id: Uuid, result: &AtsResult) -> Result<(), AppError>;

    /// Returns the certificate only if `user_id` owns it.
    async fn find_certificate(
        &self,
        user_id: &str,
        certificate_id: Uuid,
    ) -> Result<Option<CertificateRow>, AppError>;

    async fn save_certificate_verification(
        &self,
        certificate_id: Uuid,
        analysis: &CertificateAnalysis,
    ) -> Result<CertificateRow, AppError>;
}

/// JSON stored in `resumes.ats_analysis`.
pub fn resume_ats_analysis(result: &AtsResult, analyzed_at: DateTime<Utc>) -> Value {
    json!({
        "grade": result.grade,
        "strengths": result.strengths,
        "weaknesses": result.weaknesses,
        "recommendations": result.recommendations,
        "analyzedAt": analyzed_at.to_rfc3339(),
    })
}

/// JSON stored in `certificates.verification_details`.
pub fn certificate_verification_details(
    analysis: &CertificateAnalysis,
    analyzed_at: DateTime<Utc>,
) -> Value {
    json!({
        "confidence": analysis.field("confidence"),
        "reasoning": analysis.field("reasoning"),
        "recommendations": analysis.field("recommendations"),
        "analyzedAt": analyzed_at.to_rfc3339(),
    })
}

pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RESUME_COLUMNS: &str = "id, user_id, title, ats_score, ats_analysis, created_at, updated_at";
const CERTIFICATE_COLUMNS: &str = "id, user_id, name, issuing_organization, is_verified, \
     verification_status, verification_details, created_at, updated_at";

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_resume(
        &self,
        user_id: &str,
        resume_id: Uuid,
    ) -> Result<Option<ResumeRow>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes WHERE id = $1 AND user_id = $2"
        ))
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save_ats_result(&self, resume_id: Uuid, result: &AtsResult) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE resumes SET ats_score = $1, ats_analysis = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(i32::from(result.score))
        .bind(resume_ats_analysis(result, Utc::now()))
        .bind(resume_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_certificate(
        &self,
        user_id: &str,
        certificate_id: Uuid,
    ) -> Result<Option<CertificateRow>, AppError> {
        let row = sqlx::query_as::<_, CertificateRow>(&format!(
            "SELECT {CERTIFICATE_COLUMNS} FROM certificates WHERE id = $1 AND user_id = $2"
        ))
        .bind(certificate_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn save_certificate_verification(
        &self,
        certificate_id: Uuid,
        analysis: &CertificateAnalysis,
    ) -> Result<CertificateRow, AppError> {
        let row = sqlx::query_as::<_, CertificateRow>(&format!(
            r#"
            UPDATE certificates
            SET is_verified = $1,
                verification_status = $2,
                verification_details = $3,
                updated_at = NOW()
            WHERE id = $4
            RETURNING {CERTIFICATE_COLUMNS}
            "#
        ))
        .bind(analysis.is_verified())
        .bind(analysis.status())
        .bind(certificate_verification_details(analysis, Utc::now()))
        .bind(certificate_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

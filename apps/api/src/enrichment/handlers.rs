//! Axum route handlers for the AI enrichment API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::CallerId;
use crate::enrichment::ats_score::{score_ats, AtsResult};
use crate::enrichment::certificate_verify::{verify_certificate, CertificateAnalysis};
use crate::enrichment::resume_improve::improve_resume;
use crate::errors::AppError;
use crate::models::certificate::CertificateRow;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveResumeRequest {
    #[serde(default)]
    pub resume_data: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImproveResumeResponse {
    pub success: bool,
    pub improved_data: Map<String, Value>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsScoreRequest {
    #[serde(default)]
    pub resume_text: String,
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsScoreResponse {
    pub success: bool,
    pub ats_result: AtsResult,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCertificateRequest {
    pub certificate_id: Option<Uuid>,
    #[serde(default)]
    pub document_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCertificateResponse {
    pub success: bool,
    pub certificate: CertificateRow,
    pub analysis: CertificateAnalysis,
    pub message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ai/improve-resume
///
/// Rewrites the caller's resume object and returns one of the same structure.
pub async fn handle_improve_resume(
    State(state): State<AppState>,
    caller: CallerId,
    Json(request): Json<ImproveResumeRequest>,
) -> Result<Json<ImproveResumeResponse>, AppError> {
    let resume_data = match request.resume_data {
        Some(Value::Object(resume_data)) if !resume_data.is_empty() => resume_data,
        _ => return Err(AppError::Validation("Resume data is required".to_string())),
    };

    info!("Improving resume for user {}", caller.as_str());

    let improved_data = improve_resume(&resume_data, state.llm.as_ref())
        .await
        .map_err(|e| AppError::Llm(format!("Resume improvement failed: {e}")))?;

    Ok(Json(ImproveResumeResponse {
        success: true,
        improved_data,
        message: "Resume improved successfully".to_string(),
    }))
}

/// POST /api/v1/ai/ats-score
///
/// Scores resume text. With `resumeId`, ownership is checked before the
/// provider call and the result is stored on the resume.
pub async fn handle_ats_score(
    State(state): State<AppState>,
    caller: CallerId,
    Json(request): Json<AtsScoreRequest>,
) -> Result<Json<AtsScoreResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("Resume text is required".to_string()));
    }

    if let Some(resume_id) = request.resume_id {
        state
            .store
            .find_resume(caller.as_str(), resume_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
    }

    let ats_result = score_ats(&request.resume_text, state.llm.as_ref())
        .await
        .map_err(|e| AppError::Llm(format!("ATS scoring failed: {e}")))?;

    if let Some(resume_id) = request.resume_id {
        state.store.save_ats_result(resume_id, &ats_result).await?;
    }

    let message = format!(
        "ATS Score: {}/100 (Grade: {})",
        ats_result.score, ats_result.grade
    );

    Ok(Json(AtsScoreResponse {
        success: true,
        ats_result,
        message,
    }))
}

/// POST /api/v1/ai/verify-certificate
///
/// Assesses a certificate the caller owns and stores the verdict on it.
pub async fn handle_verify_certificate(
    State(state): State<AppState>,
    caller: CallerId,
    Json(request): Json<VerifyCertificateRequest>,
) -> Result<Json<VerifyCertificateResponse>, AppError> {
    let certificate_id = match request.certificate_id {
        Some(id) if !request.document_text.trim().is_empty() => id,
        _ => {
            return Err(AppError::Validation(
                "Certificate ID and document text are required".to_string(),
            ))
        }
    };

    state
        .store
        .find_certificate(caller.as_str(), certificate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Certificate {certificate_id} not found")))?;

    let analysis = verify_certificate(&request.document_text, state.llm.as_ref())
        .await
        .map_err(|e| AppError::Llm(format!("Certificate verification failed: {e}")))?;

    let certificate = state
        .store
        .save_certificate_verification(certificate_id, &analysis)
        .await?;

    let message = format!(
        "Certificate {} with {}% confidence",
        analysis.status(),
        analysis.text("confidence")
    );

    Ok(Json(VerifyCertificateResponse {
        success: true,
        certificate,
        analysis,
        message,
    }))
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRow {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub issuing_organization: String,
    pub is_verified: bool,
    /// unverified | pending | verified | suspicious | invalid
    pub verification_status: String,
    pub verification_details: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

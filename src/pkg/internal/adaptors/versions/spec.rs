use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Named snapshot of a resume at a point in time. Append-only log keyed by
/// owner, parallel to the live record and outside the review workflow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeVersionEntry {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub data: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

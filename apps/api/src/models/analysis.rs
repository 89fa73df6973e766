use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::feedback::StructuredFeedback;

/// A stored assessment of one resume against one job description.
/// Created exactly once per pipeline run and never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub document_id: Uuid,
    pub job_role: String,
    pub job_description: String,
    /// Always within [0, 100]; the normalizer guarantees it before insert.
    pub match_score: i32,
    pub feedback: Json<StructuredFeedback>,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

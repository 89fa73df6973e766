use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An ingested resume document. Immutable after creation; analyses reference
/// it by id and never embed it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Opaque blob-store key; raw bytes live there, not in the database.
    pub storage_ref: String,
    pub original_name: String,
    pub uploaded_at: DateTime<Utc>,
}

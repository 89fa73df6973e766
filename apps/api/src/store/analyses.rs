use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::identity::OwnerId;
use crate::models::analysis::AnalysisRow;
use crate::models::feedback::StructuredFeedback;

/// Insert parameters for a new analysis. `owner` is passed separately and is
/// always the authenticated caller, never client input.
pub struct NewAnalysis<'a> {
    pub document_id: Uuid,
    pub job_role: &'a str,
    pub job_description: &'a str,
    pub match_score: i32,
    pub feedback: &'a StructuredFeedback,
    pub matched_keywords: &'a [String],
    pub missing_keywords: &'a [String],
}

pub async fn insert(
    pool: &PgPool,
    owner: OwnerId,
    new: NewAnalysis<'_>,
) -> Result<AnalysisRow, sqlx::Error> {
    sqlx::query_as::<_, AnalysisRow>(
        r#"
        INSERT INTO analyses
            (id, owner_id, document_id, job_role, job_description,
             match_score, feedback, matched_keywords, missing_keywords)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner.0)
    .bind(new.document_id)
    .bind(new.job_role)
    .bind(new.job_description)
    .bind(new.match_score)
    .bind(sqlx::types::Json(new.feedback))
    .bind(new.matched_keywords)
    .bind(new.missing_keywords)
    .fetch_one(pool)
    .await
}

pub async fn fetch(
    pool: &PgPool,
    owner: OwnerId,
    id: Uuid,
) -> Result<Option<AnalysisRow>, sqlx::Error> {
    sqlx::query_as::<_, AnalysisRow>("SELECT * FROM analyses WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner.0)
        .fetch_optional(pool)
        .await
}

/// Newest first.
pub async fn list(pool: &PgPool, owner: OwnerId) -> Result<Vec<AnalysisRow>, sqlx::Error> {
    sqlx::query_as::<_, AnalysisRow>(
        "SELECT * FROM analyses WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(owner.0)
    .fetch_all(pool)
    .await
}

/// Returns the number of rows removed. 0 means not found or not owned by the
/// caller; deleting the same id twice reports 0 the second time.
pub async fn delete(pool: &PgPool, owner: OwnerId, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM analyses WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner.0)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Bulk removal for account deletion Phase 1. Runs inside the caller's
/// transaction so the purge is all-or-nothing.
pub async fn delete_all_for_owner(
    tx: &mut Transaction<'_, Postgres>,
    owner: OwnerId,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM analyses WHERE owner_id = $1")
        .bind(owner.0)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

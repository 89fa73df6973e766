use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::identity::OwnerId;
use crate::models::document::DocumentRow;

pub async fn insert(
    pool: &PgPool,
    owner: OwnerId,
    storage_ref: &str,
    original_name: &str,
) -> Result<DocumentRow, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        r#"
        INSERT INTO documents (id, owner_id, storage_ref, original_name)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner.0)
    .bind(storage_ref)
    .bind(original_name)
    .fetch_one(pool)
    .await
}

pub async fn fetch(
    pool: &PgPool,
    owner: OwnerId,
    id: Uuid,
) -> Result<Option<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(owner.0)
        .fetch_optional(pool)
        .await
}

pub async fn list(pool: &PgPool, owner: OwnerId) -> Result<Vec<DocumentRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentRow>(
        "SELECT * FROM documents WHERE owner_id = $1 ORDER BY uploaded_at DESC",
    )
    .bind(owner.0)
    .fetch_all(pool)
    .await
}

/// Deletes one document. Dependent analyses go with it via the foreign key
/// cascade. Returns the number of rows removed (0 means not found or not
/// owned by the caller).
pub async fn delete(pool: &PgPool, owner: OwnerId, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND owner_id = $2")
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
    let result = sqlx::query("DELETE FROM documents WHERE owner_id = $1")
        .bind(owner.0)
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected())
}

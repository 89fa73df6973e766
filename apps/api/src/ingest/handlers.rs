use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::Identity;
use crate::models::document::DocumentRow;
use crate::state::AppState;
use crate::store;

use super::validation::{normalize_media_type, validate_upload};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub document_id: Uuid,
    pub original_name: String,
    pub size_bytes: usize,
    pub uploaded_at: DateTime<Utc>,
}

/// POST /api/v1/documents (multipart, field `file`)
pub async fn handle_upload(
    State(state): State<AppState>,
    identity: Identity,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or("resume").to_string();
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
        upload = Some((original_name, media_type, bytes));
        break;
    }

    let (original_name, media_type, bytes) =
        upload.ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))?;

    let media_type = normalize_media_type(&media_type);
    validate_upload(
        &media_type,
        bytes.len(),
        &state.config.allowed_media_types,
        state.config.max_upload_bytes,
    )?;

    let storage_ref = format!("resumes/{}/{}", identity.owner, Uuid::new_v4());
    state.blobs.put(&storage_ref, bytes.to_vec(), &media_type).await?;

    let document =
        store::documents::insert(&state.db, identity.owner, &storage_ref, &original_name).await?;

    info!(
        document_id = %document.id,
        owner = %identity.owner,
        size_bytes = bytes.len(),
        media_type = %media_type,
        "document ingested"
    );

    Ok(Json(UploadResponse {
        document_id: document.id,
        original_name: document.original_name,
        size_bytes: bytes.len(),
        uploaded_at: document.uploaded_at,
    }))
}

/// GET /api/v1/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<DocumentRow>>, AppError> {
    let rows = store::documents::list(&state.db, identity.owner).await?;
    Ok(Json(rows))
}

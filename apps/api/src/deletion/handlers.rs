use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::store;

use super::account::{self, AccountDeletionReport, SqlOwnerDataPurge};

/// DELETE /api/v1/analyses/:id
///
/// Deleting an id that is already gone (or was never yours) reports
/// `NOT_FOUND`; a second identical call gets the same answer.
pub async fn handle_delete_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    identity: Identity,
) -> Result<StatusCode, AppError> {
    let removed = store::analyses::delete(&state.db, identity.owner, id).await?;
    if removed == 0 {
        return Err(AppError::NotFound(format!("Analysis {id} not found")));
    }
    info!(analysis_id = %id, owner = %identity.owner, "analysis deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/documents/:id
///
/// Dependent analyses are removed with the document; the reverse never
/// happens.
pub async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    identity: Identity,
) -> Result<StatusCode, AppError> {
    let removed = store::documents::delete(&state.db, identity.owner, id).await?;
    if removed == 0 {
        return Err(AppError::NotFound(format!("Document {id} not found")));
    }
    info!(document_id = %id, owner = %identity.owner, "document deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AccountDeletionRequest {
    /// Must equal the confirmation token (case-insensitive).
    pub confirmation: String,
}

/// DELETE /api/v1/account
pub async fn handle_delete_account(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<AccountDeletionRequest>,
) -> Result<Json<AccountDeletionReport>, AppError> {
    let purge = SqlOwnerDataPurge::new(state.db.clone());
    let report = account::delete_account(
        &purge,
        state.identity.as_ref(),
        identity.owner,
        &req.confirmation,
    )
    .await?;
    Ok(Json(report))
}

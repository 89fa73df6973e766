use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::Identity;
use crate::models::analysis::AnalysisRow;
use crate::state::AppState;
use crate::store;

use super::pipeline::{self, AnalyzeParams};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub document_id: Uuid,
    pub job_description: String,
    pub job_role: String,
}

/// POST /api/v1/analyses
pub async fn handle_analyze(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisRow>, AppError> {
    let row = pipeline::run(
        &state,
        identity.owner,
        AnalyzeParams {
            document_id: req.document_id,
            job_description: req.job_description,
            job_role: req.job_role,
        },
    )
    .await?;
    Ok(Json(row))
}

/// GET /api/v1/analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<AnalysisRow>>, AppError> {
    let rows = store::analyses::list(&state.db, identity.owner).await?;
    Ok(Json(rows))
}

/// GET /api/v1/analyses/:id
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    identity: Identity,
) -> Result<Json<AnalysisRow>, AppError> {
    store::analyses::fetch(&state.db, identity.owner, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))
}

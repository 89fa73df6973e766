//! Analysis pipeline: guard lookup → blob fetch → extraction → prompt →
//! inference → normalization → persistence.
//!
//! Exactly one new analysis row per successful call; repeated identical
//! requests deliberately create distinct records. The row is written only
//! after a result (real or fallback) exists, so a failed or timed-out
//! inference call leaves nothing behind.

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::OwnerId;
use crate::models::analysis::AnalysisRow;
use crate::state::AppState;
use crate::store;

use super::normalize::normalize_response;
use super::prompts::build_analysis_prompt;

/// Floor below which a resume cannot be meaningfully analyzed.
pub const MIN_RESUME_CHARS: usize = 50;

pub struct AnalyzeParams {
    pub document_id: Uuid,
    pub job_description: String,
    pub job_role: String,
}

pub async fn run(
    state: &AppState,
    owner: OwnerId,
    params: AnalyzeParams,
) -> Result<AnalysisRow, AppError> {
    let job_role = params.job_role.trim();
    if job_role.is_empty() {
        return Err(AppError::Validation("job role is required".to_string()));
    }
    if params.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job description is required".to_string(),
        ));
    }

    let document = store::documents::fetch(&state.db, owner, params.document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {} not found", params.document_id)))?;

    let stored = state.blobs.get(&document.storage_ref).await?;
    let media_type = stored
        .media_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    let resume_text = state.extractor.extract(&stored.bytes, media_type)?;

    if resume_text.trim().chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::Validation(format!(
            "resume text is too short for meaningful analysis (minimum {MIN_RESUME_CHARS} characters)"
        )));
    }

    let prompt = build_analysis_prompt(job_role, &params.job_description, &resume_text);
    let raw_reply = state.inference.generate(&prompt).await?;
    let scored = normalize_response(&raw_reply);

    let row = store::analyses::insert(
        &state.db,
        owner,
        store::analyses::NewAnalysis {
            document_id: document.id,
            job_role,
            job_description: &params.job_description,
            match_score: scored.match_score,
            feedback: &scored.feedback,
            matched_keywords: &scored.matched_keywords,
            missing_keywords: &scored.missing_keywords,
        },
    )
    .await?;

    info!(
        analysis_id = %row.id,
        owner = %owner,
        match_score = row.match_score,
        "analysis stored"
    );
    Ok(row)
}

pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::analysis::handlers as analysis_handlers;
use crate::deletion::handlers as deletion_handlers;
use crate::ingest::handlers as ingest_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Leave headroom above the upload ceiling for multipart framing; the
    // ingest validator enforces the real limit.
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + 64 * 1024);

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/documents",
            post(ingest_handlers::handle_upload).get(ingest_handlers::handle_list_documents),
        )
        .route(
            "/api/v1/documents/:id",
            delete(deletion_handlers::handle_delete_document),
        )
        .route(
            "/api/v1/analyses",
            post(analysis_handlers::handle_analyze).get(analysis_handlers::handle_list_analyses),
        )
        .route(
            "/api/v1/analyses/:id",
            get(analysis_handlers::handle_get_analysis)
                .delete(deletion_handlers::handle_delete_analysis),
        )
        .route(
            "/api/v1/account",
            delete(deletion_handlers::handle_delete_account),
        )
        .layer(body_limit)
        .with_state(state)
}

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::identity::IdentityProvider;
use crate::inference::InferenceGateway;
use crate::storage::extract::TextExtractor;
use crate::storage::BlobStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. The trait objects are the seams tests swap out: a scripted
/// inference gateway, a counting identity provider, a fixed extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub blobs: BlobStore,
    pub inference: Arc<dyn InferenceGateway>,
    pub identity: Arc<dyn IdentityProvider>,
    pub extractor: Arc<dyn TextExtractor>,
    pub config: Config,
}

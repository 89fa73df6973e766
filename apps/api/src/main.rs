mod analysis;
mod config;
mod db;
mod deletion;
mod errors;
mod identity;
mod inference;
mod ingest;
mod models;
mod routes;
mod state;
mod storage;
mod store;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::identity::{GoTrueProvider, IdentityProvider};
use crate::inference::{GeminiClient, InferenceGateway};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::extract::{BundledExtractor, TextExtractor};
use crate::storage::BlobStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResuMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and apply migrations
    let db = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    // Initialize S3 / MinIO blob store
    let s3 = build_s3_client(&config).await;
    let blobs = BlobStore::new(s3, config.s3_bucket.clone());
    info!("Blob store initialized (bucket: {})", config.s3_bucket);

    // Initialize inference gateway
    let inference: Arc<dyn InferenceGateway> = Arc::new(GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        Duration::from_secs(config.inference_timeout_secs),
    ));
    info!("Inference client initialized (model: {})", config.gemini_model);

    // Initialize identity provider client
    let identity: Arc<dyn IdentityProvider> = Arc::new(GoTrueProvider::new(
        config.identity_url.clone(),
        config.identity_service_key.clone(),
    ));
    info!("Identity provider client initialized");

    let extractor: Arc<dyn TextExtractor> = Arc::new(BundledExtractor);

    // Build app state
    let state = AppState {
        db,
        blobs,
        inference,
        identity,
        extractor,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "resumatch-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}

mod archive;
mod auth;
mod config;
mod db;
mod entitlements;
mod errors;
mod llm_client;
mod models;
mod optimization;
mod render;
mod routes;
mod scoring;
mod state;
#[cfg(test)]
mod testing;
mod workflow;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::archive::S3ResultArchive;
use crate::auth::PgSessionAuth;
use crate::config::Config;
use crate::db::create_pool;
use crate::entitlements::PgEntitlementService;
use crate::llm_client::LlmClient;
use crate::optimization::{LlmProjectAnalyzer, LlmResumeOptimizer};
use crate::routes::build_router;
use crate::scoring::RubricScoreEvaluator;
use crate::state::AppState;
use crate::workflow::{RedisWorkflowStore, WorkflowController, WorkflowDeps};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume optimizer v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;

    let redis = redis::Client::open(config.redis_url.clone()).context("Invalid REDIS_URL")?;
    info!(
        "Redis workflow store initialized (ttl {}s)",
        config.workflow_ttl_secs
    );

    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    let llm = LlmClient::new(config.anthropic_api_key.clone())
        .context("Failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let entitlements = Arc::new(PgEntitlementService::new(db.clone()));
    let auth = Arc::new(PgSessionAuth::new(db));

    let controller = WorkflowController::new(WorkflowDeps {
        optimizer: Arc::new(LlmResumeOptimizer::new(llm.clone())),
        scorer: Arc::new(RubricScoreEvaluator),
        analyzer: Arc::new(LlmProjectAnalyzer::new(llm)),
        entitlements: entitlements.clone(),
        auth: auth.clone(),
        store: Arc::new(RedisWorkflowStore::new(redis, config.workflow_ttl_secs)),
        archive: Arc::new(S3ResultArchive::new(s3, config.s3_bucket.clone())),
    });

    let state = AppState {
        controller: Arc::new(controller),
        entitlements,
        auth,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

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
        "resume-optimizer-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}

mod ai_client;
mod config;
mod db;
mod errors;
mod extraction;
mod ingest;
mod matching;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ai_client::AiClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::AiMatchScorer;
use crate::matching::scheduler::MatchScorer;
use crate::models::job::JobDescription;
use crate::models::resume::Resume;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgStore;
use crate::store::RecordStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (panics on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Talentmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;

    // Initialize AI client
    let ai = AiClient::new(
        config.gemini_base_url.clone(),
        config.gemini_api_keys.clone(),
    );
    info!(
        "AI client initialized ({} key(s) in rotation)",
        config.gemini_api_keys.len()
    );

    // Collection stores
    let resumes: Arc<dyn RecordStore<Resume>> = Arc::new(PgStore::resumes(pool.clone()));
    let jobs: Arc<dyn RecordStore<JobDescription>> = Arc::new(PgStore::jobs(pool));

    // Scorer backing the matching scheduler
    let scorer: Arc<dyn MatchScorer> = Arc::new(AiMatchScorer { ai: ai.clone() });

    // Build app state
    let state = AppState {
        ai,
        resumes,
        jobs,
        scorer,
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

//! Student delay risk prediction server.
//!
//! Serves the interactive student form, a single-record prediction endpoint
//! and a CSV batch endpoint on top of the inference core. The trained
//! pipeline artifact is loaded once at startup and shared read-only; a
//! missing or unreadable artifact is fatal before the server binds.

mod config;
mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atraso_core::model::{GbdtArtifact, ModelMetadata, Pipeline};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atraso_web=debug,atraso_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Atraso prediction server starting...");
    tracing::info!("Artifact: {}", config.artifact_path.display());

    // Load the pipeline artifact once; absence is fatal before serving.
    let artifact = match GbdtArtifact::load(&config.artifact_path) {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::error!("Cannot start: {}", e);
            std::process::exit(1);
        }
    };
    let metadata = artifact.metadata().clone();
    tracing::info!(
        "Pipeline ready: {} numeric + {} categorical columns",
        metadata.numeric_features,
        metadata.categorical_features
    );

    // Build application state
    let state = AppState {
        pipeline: Arc::new(artifact),
        metadata,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<dyn Pipeline>,
    pub metadata: ModelMetadata,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::form::index))
        .route("/health", get(handlers::health::check))
        .route("/api/v1/form", get(handlers::form::descriptor))
        .route("/api/v1/predict", post(handlers::predict::single))
        .route("/api/v1/predict/batch", post(handlers::batch::upload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

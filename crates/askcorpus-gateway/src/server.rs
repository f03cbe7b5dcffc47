//! HTTP server implementation using Axum.

use askcorpus_core::config::AskCorpusConfig;
use askcorpus_core::error::Result;
use askcorpus_core::traits::{CompletionBackend, EmbeddingBackend};
use askcorpus_retrieval::VectorStore;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
///
/// The store is loaded once before the server starts and never mutated
/// afterwards; concurrent requests read it without locking.
pub struct AppState {
    pub config: AskCorpusConfig,
    pub store: VectorStore,
    pub embeddings: Arc<dyn EmbeddingBackend>,
    pub llm: Arc<dyn CompletionBackend>,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(super::routes::chat))
        .route("/health", get(super::routes::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn start(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.gateway.host, state.config.gateway.port);
    let router = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("gateway listening on http://{addr}");
    axum::serve(listener, router).await?;
    Ok(())
}

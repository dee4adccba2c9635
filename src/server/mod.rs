use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::BackendKind;
use crate::query::QueryService;

pub mod routes;

/// Server state
#[derive(Debug, Clone)]
pub struct AppState {
    pub queries: QueryService,
}

impl AppState {
    pub fn new(queries: QueryService) -> Self {
        Self { queries }
    }
}

/// Routes for the catalog API
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/wandersteine", get(routes::list_all))
        .route("/api/wandersteine/recent", get(routes::list_recent))
        .route("/api/wandersteine/{unique_id}", get(routes::get_by_unique_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(addr: SocketAddr, queries: QueryService, backend: BackendKind) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(queries));
    let app = router(state);

    tracing::info!(%backend, "Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

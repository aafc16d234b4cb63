//! HTTP hosting mode.
//!
//! Exposes the analysis workflow over axum and serves the rendered chart
//! files so a browser front end can display them.

mod error;
pub mod handlers;

use crate::workflow::AppContext;
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router.
pub fn router(ctx: Arc<AppContext>, chart_dir: &Path) -> Router {
    Router::new()
        .route("/analyze/:product_id", get(handlers::analyze))
        .route("/analyze", get(handlers::analyze_missing_id))
        .route("/analyze/", get(handlers::analyze_missing_id))
        .route("/reload", post(handlers::reload))
        .route("/health", get(handlers::health))
        .nest_service("/charts", ServeDir::new(chart_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(ctx: Arc<AppContext>, chart_dir: &Path, bind_address: &str) -> Result<()> {
    let app = router(ctx, chart_dir);

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

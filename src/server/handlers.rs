//! Request handlers.

use crate::error::AppError;
use crate::workflow::AppContext;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

pub type SharedContext = Arc<AppContext>;

/// `GET /analyze/:product_id`
pub async fn analyze(
    State(ctx): State<SharedContext>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    info!("Received product_id: {}", product_id);

    let result = ctx.analyze_product(&product_id).await?;

    Ok(Json(json!({
        "status": "success",
        "product_summary": result.product_summary,
        "bar_chart": result.bar_chart,
        "pie_chart": result.pie_chart,
        "outputs": result.outputs,
    })))
}

/// `GET /analyze` and `GET /analyze/` without an id.
pub async fn analyze_missing_id() -> AppError {
    AppError::InvalidInput("Missing product_id parameter.".to_string())
}

/// `POST /reload`
pub async fn reload(State(ctx): State<SharedContext>) -> Result<Json<Value>, AppError> {
    let snapshot = ctx.catalog.reload().await?;

    Ok(Json(json!({
        "status": "success",
        "products": snapshot.products.len(),
        "reviews": snapshot.reviews.len(),
    })))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

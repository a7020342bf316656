//! Snapshot, catalog-count, and health endpoints.

use crate::AppState;
use crate::errors::{Error, Result};
use crate::stats::StatsDomain;
use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// GET /api/{domain}/stats
///
/// Always 200 with a snapshot; outages are masked by synthetic data. The
/// Cache-Control lifetime mirrors the server-side freshness window.
pub async fn domain_stats(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Response> {
    let domain: StatsDomain = domain
        .parse()
        .map_err(|_| Error::bad_request(format!("Unknown statistics domain: {domain}")))?;

    let snapshot = state.stats.get_stats(domain).await;
    let max_age = state.config.stats.freshness_window.as_secs();

    Ok((
        [(header::CACHE_CONTROL, format!("public, max-age={max_age}"))],
        Json(snapshot),
    )
        .into_response())
}

/// GET /api/stats
///
/// Fixed catalog counts for the landing page tiles.
pub async fn catalog_counts() -> Json<serde_json::Value> {
    Json(json!({
        "flights": 1000,
        "hotels": 500,
        "packages": 300,
        "reviews": 800
    }))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

//! Filtered insights endpoint.

use crate::AppState;
use crate::errors::Result;
use crate::stats::insights::{InsightsRequest, InsightsResponse};
use axum::{Json, extract::State};

/// POST /api/insights
pub async fn insights(
    State(state): State<AppState>,
    Json(request): Json<InsightsRequest>,
) -> Result<Json<InsightsResponse>> {
    let response = state.stats.insights(request).await?;
    Ok(Json(response))
}

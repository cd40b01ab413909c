//! Dashboard statistics endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::DashboardStats};

use super::CallerIdentity;

/// Summary statistics over the whole corpus
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    CallerIdentity(identity): CallerIdentity,
) -> AppResult<Json<DashboardStats>> {
    let stats = state.services.stats.get_stats(&identity).await?;
    Ok(Json(stats))
}

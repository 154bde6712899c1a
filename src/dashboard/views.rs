use super::models::DashboardSummary;
use super::services;
use crate::common::auth::{Principal, protect};
use crate::common::errors::ApiResult;
use crate::common::state::AppState;
use axum::extract::State;
use axum::response::Json;
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(get_dashboard))
        .with_state(state.clone());

    protect(router, state, "dashboard")
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = OK, body = DashboardSummary)),
    tag = "dashboard",
    summary = "Role-scoped dashboard summary",
    description = "Counts, breakdowns and recent activity across the caller's visible routes, farms, samples and reports."
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<DashboardSummary>> {
    Ok(Json(services::summarize(&state.db, &principal).await?))
}

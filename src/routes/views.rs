use super::models::{
    self as routes, Route, RouteCreate, RouteStatus, RouteStatusUpdate, RouteUpdate,
};
use super::services;
use crate::common::auth::{Principal, protect};
use crate::common::errors::{ApiError, ApiResult};
use crate::common::scope;
use crate::common::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(get_all_routes, create_route))
        .routes(routes!(get_one_route, update_route, delete_route))
        .routes(routes!(update_route_status))
        .with_state(state.clone());

    protect(router, state, "routes")
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RouteListParams {
    /// Restrict the listing to one status
    pub status: Option<RouteStatus>,
}

#[utoipa::path(
    get,
    path = "/",
    params(RouteListParams),
    responses((status = OK, body = Vec<Route>)),
    tag = "routes",
    summary = "List visible routes with progress"
)]
pub async fn get_all_routes(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<RouteListParams>,
) -> ApiResult<Json<Vec<Route>>> {
    let mut select =
        scope::routes_for(&principal).order_by_desc(routes::Column::DateAssigned);
    if let Some(status) = params.status {
        select = select.filter(routes::Column::Status.eq(status));
    }

    let models = select.all(&state.db).await?;
    Ok(Json(services::enrich_routes(&state.db, models).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Route ID")),
    responses((status = OK, body = Route), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "routes",
    summary = "Get one route"
)]
pub async fn get_one_route(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Route>> {
    let model = scope::load_route_checked(&state.db, &principal, id).await?;
    Ok(Json(services::enrich_route(&state.db, model).await?))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = RouteCreate,
    responses((status = CREATED, body = Route), (status = BAD_REQUEST), (status = FORBIDDEN)),
    tag = "routes",
    summary = "Create a route"
)]
pub async fn create_route(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<RouteCreate>,
) -> ApiResult<(StatusCode, Json<Route>)> {
    payload.validate()?;

    // Same predicate as reads: enumerators may only hold routes assigned to
    // themselves.
    if !principal.is_admin() && payload.assigned_to != principal.user_id {
        return Err(ApiError::forbidden("create", "route"));
    }
    services::require_enumerator(&state.db, payload.assigned_to).await?;

    let now = Utc::now();
    let model = routes::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        assigned_to: Set(payload.assigned_to),
        date_assigned: Set(now.date_naive()),
        status: Set(payload.status.unwrap_or(RouteStatus::Pending)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = model.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(services::enrich_route(&state.db, inserted).await?),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Route ID")),
    request_body = RouteUpdate,
    responses((status = OK, body = Route), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "routes",
    summary = "Update a route"
)]
pub async fn update_route(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<RouteUpdate>,
) -> ApiResult<Json<Route>> {
    payload.validate()?;
    let model = scope::load_route_checked(&state.db, &principal, id).await?;

    if !principal.is_admin() && payload.assigned_to != principal.user_id {
        return Err(ApiError::forbidden("reassign", "route"));
    }
    services::require_enumerator(&state.db, payload.assigned_to).await?;

    let mut active = model.into_active_model();
    active.name = Set(payload.name);
    active.assigned_to = Set(payload.assigned_to);
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(services::enrich_route(&state.db, updated).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Route ID")),
    responses((status = NO_CONTENT), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "routes",
    summary = "Delete a route and its farms"
)]
pub async fn delete_route(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let model = scope::load_route_checked(&state.db, &principal, id).await?;
    services::delete_routes_cascade(&state.db, &[model.id]).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/update_status",
    params(("id" = Uuid, Path, description = "Route ID")),
    request_body = RouteStatusUpdate,
    responses((status = OK, body = Route), (status = BAD_REQUEST), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "routes",
    summary = "Update the status of a route",
    description = "Allowed for admins and the route's assigned enumerator."
)]
pub async fn update_route_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<RouteStatusUpdate>,
) -> ApiResult<Json<Route>> {
    let model = scope::load_route_checked(&state.db, &principal, id).await?;

    let Ok(status) = RouteStatus::try_from_value(&payload.status) else {
        return Err(ApiError::validation(
            "status",
            "Invalid status. Choose from: pending, in_progress, complete",
        ));
    };

    let mut active = model.into_active_model();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(services::enrich_route(&state.db, updated).await?))
}

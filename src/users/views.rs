use super::models::{self as users, User, UserCreate, UserRole, UserUpdate};
use crate::common::auth::{Principal, protect};
use crate::common::errors::{ApiError, ApiResult};
use crate::common::state::AppState;
use crate::routes::services as route_services;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(get_all_users, create_user))
        .routes(routes!(get_current_user))
        .routes(routes!(get_one_user, update_user, delete_user))
        .with_state(state.clone());

    protect(router, state, "users")
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListParams {
    /// Restrict the listing to one role
    pub role: Option<UserRole>,
}

#[utoipa::path(
    get,
    path = "/",
    params(UserListParams),
    responses((status = OK, body = Vec<User>)),
    tag = "users",
    summary = "List users"
)]
pub async fn get_all_users(
    State(state): State<AppState>,
    _principal: Principal,
    Query(params): Query<UserListParams>,
) -> ApiResult<Json<Vec<User>>> {
    let mut select = users::Entity::find().order_by_asc(users::Column::Username);
    if let Some(role) = params.role {
        select = select.filter(users::Column::Role.eq(role));
    }

    let models = select.all(&state.db).await?;
    Ok(Json(models.into_iter().map(User::from).collect()))
}

#[utoipa::path(
    get,
    path = "/me",
    responses((status = OK, body = User)),
    tag = "users",
    summary = "Get the current user profile"
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    principal: Principal,
) -> ApiResult<Json<User>> {
    let model = users::Entity::find_by_id(principal.user_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::Unauthenticated)?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = OK, body = User), (status = NOT_FOUND)),
    tag = "users",
    summary = "Get one user"
)]
pub async fn get_one_user(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let model = users::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = UserCreate,
    responses((status = CREATED, body = User), (status = FORBIDDEN)),
    tag = "users",
    summary = "Create a user (admin only)"
)]
pub async fn create_user(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<UserCreate>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if !principal.is_admin() {
        return Err(ApiError::forbidden("create", "user"));
    }
    payload.validate()?;

    let now = Utc::now();
    let model = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(payload.username),
        email: Set(payload.email),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        role: Set(payload.role),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = model.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(inserted.into())))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UserUpdate,
    responses((status = OK, body = User), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "users",
    summary = "Update a user (admin only; role is immutable)"
)]
pub async fn update_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdate>,
) -> ApiResult<Json<User>> {
    if !principal.is_admin() {
        return Err(ApiError::forbidden("update", "user"));
    }
    payload.validate()?;

    let model = users::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))?;

    let mut active = model.into_active_model();
    active.username = Set(payload.username);
    active.email = Set(payload.email);
    active.first_name = Set(payload.first_name);
    active.last_name = Set(payload.last_name);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = NO_CONTENT), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "users",
    summary = "Delete a user and the routes assigned to them (admin only)"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !principal.is_admin() {
        return Err(ApiError::forbidden("delete", "user"));
    }

    let model = users::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("user", id))?;

    // Deleting a user deletes their routes and everything underneath; this
    // mirrors the schema's ON DELETE CASCADE so behavior is identical on
    // backends without foreign-key enforcement.
    let route_ids: Vec<Uuid> = crate::routes::models::Entity::find()
        .filter(crate::routes::models::Column::AssignedTo.eq(model.id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|route| route.id)
        .collect();
    route_services::delete_routes_cascade(&state.db, &route_ids).await?;

    users::Entity::delete_by_id(model.id).exec(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

use super::models::{self as crops, Crop, CropCreate, CropUpdate};
use crate::common::auth::{Principal, protect};
use crate::common::errors::{ApiError, ApiResult};
use crate::common::scope;
use crate::common::state::AppState;
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
        .routes(routes!(get_all_crops, create_crop))
        .routes(routes!(get_one_crop, update_crop, delete_crop))
        .with_state(state.clone());

    protect(router, state, "crops")
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CropListParams {
    /// Restrict the listing to one farm
    pub farm: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/",
    params(CropListParams),
    responses((status = OK, body = Vec<Crop>)),
    tag = "crops",
    summary = "List visible crops"
)]
pub async fn get_all_crops(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<CropListParams>,
) -> ApiResult<Json<Vec<Crop>>> {
    let mut select = scope::crops_for(&principal).order_by_desc(crops::Column::PlantingDate);
    if let Some(farm_id) = params.farm {
        select = select.filter(crops::Column::FarmId.eq(farm_id));
    }

    let models = select.all(&state.db).await?;
    Ok(Json(models.into_iter().map(Crop::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Crop ID")),
    responses((status = OK, body = Crop), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "crops",
    summary = "Get one crop"
)]
pub async fn get_one_crop(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Crop>> {
    let model = crops::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("crop", id))?;
    scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = CropCreate,
    responses((status = CREATED, body = Crop), (status = BAD_REQUEST), (status = FORBIDDEN)),
    tag = "crops",
    summary = "Record a crop on a visible farm"
)]
pub async fn create_crop(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<CropCreate>,
) -> ApiResult<(StatusCode, Json<Crop>)> {
    payload.validate()?;
    scope::load_farm_checked(&state.db, &principal, payload.farm_id).await?;

    let now = Utc::now();
    let model = crops::ActiveModel {
        id: Set(Uuid::new_v4()),
        farm_id: Set(payload.farm_id),
        crop_type: Set(payload.crop_type),
        variety: Set(payload.variety),
        planting_date: Set(payload.planting_date),
        expected_harvest: Set(payload.expected_harvest),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = model.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(inserted.into())))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Crop ID")),
    request_body = CropUpdate,
    responses((status = OK, body = Crop), (status = BAD_REQUEST), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "crops",
    summary = "Update a crop"
)]
pub async fn update_crop(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<CropUpdate>,
) -> ApiResult<Json<Crop>> {
    payload.validate()?;

    let model = crops::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("crop", id))?;
    scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;
    if payload.farm_id != model.farm_id {
        scope::load_farm_checked(&state.db, &principal, payload.farm_id).await?;
    }

    let mut active = model.into_active_model();
    active.farm_id = Set(payload.farm_id);
    active.crop_type = Set(payload.crop_type);
    active.variety = Set(payload.variety);
    active.planting_date = Set(payload.planting_date);
    active.expected_harvest = Set(payload.expected_harvest);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Crop ID")),
    responses((status = NO_CONTENT), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "crops",
    summary = "Delete a crop"
)]
pub async fn delete_crop(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let model = crops::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("crop", id))?;
    scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;

    crops::Entity::delete_by_id(model.id).exec(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}

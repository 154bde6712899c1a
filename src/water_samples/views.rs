use super::models::{self as water_samples, WaterSample, WaterSampleCreate, WaterSampleUpdate};
use crate::common::auth::{Principal, protect};
use crate::common::errors::{ApiError, ApiResult};
use crate::common::scope;
use crate::common::state::AppState;
use crate::farms::services as farm_services;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::collections::HashSet;
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(get_all_water_samples, create_water_sample))
        .routes(routes!(
            get_one_water_sample,
            update_water_sample,
            delete_water_sample
        ))
        .with_state(state.clone());

    protect(router, state, "water-samples")
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct WaterSampleListParams {
    /// Restrict the listing to one farm
    pub farm: Option<Uuid>,
    pub min_ph: Option<Decimal>,
    pub max_ph: Option<Decimal>,
}

#[utoipa::path(
    get,
    path = "/",
    params(WaterSampleListParams),
    responses((status = OK, body = Vec<WaterSample>)),
    tag = "water-samples",
    summary = "List visible water samples"
)]
pub async fn get_all_water_samples(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<WaterSampleListParams>,
) -> ApiResult<Json<Vec<WaterSample>>> {
    let mut select =
        scope::water_samples_for(&principal).order_by_desc(water_samples::Column::SampleDate);
    if let Some(farm_id) = params.farm {
        select = select.filter(water_samples::Column::FarmId.eq(farm_id));
    }
    if let Some(min_ph) = params.min_ph {
        select = select.filter(water_samples::Column::Ph.gte(min_ph));
    }
    if let Some(max_ph) = params.max_ph {
        select = select.filter(water_samples::Column::Ph.lte(max_ph));
    }

    let models = select.all(&state.db).await?;

    let farm_ids: Vec<Uuid> = models
        .iter()
        .map(|model| model.farm_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let names = farm_services::farm_names(&state.db, &farm_ids).await?;

    Ok(Json(
        models
            .into_iter()
            .map(|model| {
                let farm_name = names.get(&model.farm_id).cloned().unwrap_or_default();
                WaterSample::with_farm_name(model, farm_name)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Water sample ID")),
    responses((status = OK, body = WaterSample), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "water-samples",
    summary = "Get one water sample"
)]
pub async fn get_one_water_sample(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WaterSample>> {
    let model = water_samples::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("water sample", id))?;
    let farm = scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;
    Ok(Json(WaterSample::with_farm_name(model, farm.name)))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = WaterSampleCreate,
    responses((status = CREATED, body = WaterSample), (status = BAD_REQUEST), (status = FORBIDDEN)),
    tag = "water-samples",
    summary = "Record a water sample on a visible farm"
)]
pub async fn create_water_sample(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<WaterSampleCreate>,
) -> ApiResult<(StatusCode, Json<WaterSample>)> {
    payload.validate()?;
    let farm = scope::load_farm_checked(&state.db, &principal, payload.farm_id).await?;

    let now = Utc::now();
    let model = water_samples::ActiveModel {
        id: Set(Uuid::new_v4()),
        farm_id: Set(payload.farm_id),
        sample_date: Set(payload.sample_date),
        source: Set(payload.source),
        ph: Set(payload.ph),
        turbidity: Set(payload.turbidity),
        notes: Set(payload.notes),
        photo: Set(payload.photo),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = model.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(WaterSample::with_farm_name(inserted, farm.name)),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Water sample ID")),
    request_body = WaterSampleUpdate,
    responses((status = OK, body = WaterSample), (status = BAD_REQUEST), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "water-samples",
    summary = "Update a water sample"
)]
pub async fn update_water_sample(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<WaterSampleUpdate>,
) -> ApiResult<Json<WaterSample>> {
    payload.validate()?;

    let model = water_samples::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("water sample", id))?;
    scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;
    let farm = scope::load_farm_checked(&state.db, &principal, payload.farm_id).await?;

    let mut active = model.into_active_model();
    active.farm_id = Set(payload.farm_id);
    active.sample_date = Set(payload.sample_date);
    active.source = Set(payload.source);
    active.ph = Set(payload.ph);
    active.turbidity = Set(payload.turbidity);
    active.notes = Set(payload.notes);
    active.photo = Set(payload.photo);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(WaterSample::with_farm_name(updated, farm.name)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Water sample ID")),
    responses((status = NO_CONTENT), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "water-samples",
    summary = "Delete a water sample"
)]
pub async fn delete_water_sample(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let model = water_samples::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("water sample", id))?;
    scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;

    water_samples::Entity::delete_by_id(model.id)
        .exec(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

use super::models::{self as soil_samples, SoilSample, SoilSampleCreate, SoilSampleUpdate};
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
        .routes(routes!(get_all_soil_samples, create_soil_sample))
        .routes(routes!(get_one_soil_sample, update_soil_sample, delete_soil_sample))
        .with_state(state.clone());

    protect(router, state, "soil-samples")
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SoilSampleListParams {
    /// Restrict the listing to one farm
    pub farm: Option<Uuid>,
    pub min_ph: Option<Decimal>,
    pub max_ph: Option<Decimal>,
}

#[utoipa::path(
    get,
    path = "/",
    params(SoilSampleListParams),
    responses((status = OK, body = Vec<SoilSample>)),
    tag = "soil-samples",
    summary = "List visible soil samples"
)]
pub async fn get_all_soil_samples(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<SoilSampleListParams>,
) -> ApiResult<Json<Vec<SoilSample>>> {
    let mut select =
        scope::soil_samples_for(&principal).order_by_desc(soil_samples::Column::SampleDate);
    if let Some(farm_id) = params.farm {
        select = select.filter(soil_samples::Column::FarmId.eq(farm_id));
    }
    if let Some(min_ph) = params.min_ph {
        select = select.filter(soil_samples::Column::Ph.gte(min_ph));
    }
    if let Some(max_ph) = params.max_ph {
        select = select.filter(soil_samples::Column::Ph.lte(max_ph));
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
                SoilSample::with_farm_name(model, farm_name)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Soil sample ID")),
    responses((status = OK, body = SoilSample), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "soil-samples",
    summary = "Get one soil sample"
)]
pub async fn get_one_soil_sample(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SoilSample>> {
    let model = soil_samples::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("soil sample", id))?;
    let farm = scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;
    Ok(Json(SoilSample::with_farm_name(model, farm.name)))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = SoilSampleCreate,
    responses((status = CREATED, body = SoilSample), (status = BAD_REQUEST), (status = FORBIDDEN)),
    tag = "soil-samples",
    summary = "Record a soil sample on a visible farm"
)]
pub async fn create_soil_sample(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<SoilSampleCreate>,
) -> ApiResult<(StatusCode, Json<SoilSample>)> {
    payload.validate()?;
    let farm = scope::load_farm_checked(&state.db, &principal, payload.farm_id).await?;

    let now = Utc::now();
    let model = soil_samples::ActiveModel {
        id: Set(Uuid::new_v4()),
        farm_id: Set(payload.farm_id),
        sample_date: Set(payload.sample_date),
        ph: Set(payload.ph),
        moisture_pct: Set(payload.moisture_pct),
        nutrient_n: Set(payload.nutrient_n),
        nutrient_p: Set(payload.nutrient_p),
        nutrient_k: Set(payload.nutrient_k),
        notes: Set(payload.notes),
        photo: Set(payload.photo),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = model.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(SoilSample::with_farm_name(inserted, farm.name)),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Soil sample ID")),
    request_body = SoilSampleUpdate,
    responses((status = OK, body = SoilSample), (status = BAD_REQUEST), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "soil-samples",
    summary = "Update a soil sample"
)]
pub async fn update_soil_sample(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<SoilSampleUpdate>,
) -> ApiResult<Json<SoilSample>> {
    payload.validate()?;

    let model = soil_samples::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("soil sample", id))?;
    scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;
    let farm = scope::load_farm_checked(&state.db, &principal, payload.farm_id).await?;

    let mut active = model.into_active_model();
    active.farm_id = Set(payload.farm_id);
    active.sample_date = Set(payload.sample_date);
    active.ph = Set(payload.ph);
    active.moisture_pct = Set(payload.moisture_pct);
    active.nutrient_n = Set(payload.nutrient_n);
    active.nutrient_p = Set(payload.nutrient_p);
    active.nutrient_k = Set(payload.nutrient_k);
    active.notes = Set(payload.notes);
    active.photo = Set(payload.photo);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(SoilSample::with_farm_name(updated, farm.name)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Soil sample ID")),
    responses((status = NO_CONTENT), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "soil-samples",
    summary = "Delete a soil sample"
)]
pub async fn delete_soil_sample(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let model = soil_samples::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("soil sample", id))?;
    scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;

    soil_samples::Entity::delete_by_id(model.id)
        .exec(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

use super::models::{self as farms, Farm, FarmCreate, FarmList, FarmUpdate};
use super::services;
use crate::common::auth::{Principal, protect};
use crate::common::errors::ApiResult;
use crate::common::scope;
use crate::common::state::AppState;
use crate::pest_disease::models::{self as pest_disease_reports, PestDiseaseReport};
use crate::soil_samples::models::{self as soil_samples, SoilSample};
use crate::water_samples::models::{self as water_samples, WaterSample};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(get_all_farms, create_farm))
        .routes(routes!(get_one_farm, update_farm, delete_farm))
        .routes(routes!(get_farm_samples))
        .routes(routes!(get_farm_pest_disease))
        .with_state(state.clone());

    protect(router, state, "farms")
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FarmListParams {
    /// Restrict the listing to one route
    pub route: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/",
    params(FarmListParams),
    responses((status = OK, body = Vec<FarmList>)),
    tag = "farms",
    summary = "List visible farms"
)]
pub async fn get_all_farms(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<FarmListParams>,
) -> ApiResult<Json<Vec<FarmList>>> {
    let mut select = scope::farms_for(&principal).order_by_desc(farms::Column::CreatedAt);
    if let Some(route_id) = params.route {
        select = select.filter(farms::Column::RouteId.eq(route_id));
    }

    let models = select.all(&state.db).await?;
    Ok(Json(services::enrich_farm_list(&state.db, models).await?))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Farm ID")),
    responses((status = OK, body = Farm), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "farms",
    summary = "Get one farm with its crops"
)]
pub async fn get_one_farm(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Farm>> {
    let model = scope::load_farm_checked(&state.db, &principal, id).await?;
    Ok(Json(services::farm_detail(&state.db, model).await?))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = FarmCreate,
    responses((status = CREATED, body = Farm), (status = BAD_REQUEST), (status = FORBIDDEN)),
    tag = "farms",
    summary = "Create a farm on a visible route"
)]
pub async fn create_farm(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<FarmCreate>,
) -> ApiResult<(StatusCode, Json<Farm>)> {
    payload.validate()?;
    scope::load_route_checked(&state.db, &principal, payload.route_id).await?;

    let now = Utc::now();
    let model = farms::ActiveModel {
        id: Set(Uuid::new_v4()),
        route_id: Set(payload.route_id),
        name: Set(payload.name),
        owner_name: Set(payload.owner_name),
        size_ha: Set(payload.size_ha),
        location: Set(payload.location),
        address: Set(payload.address),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        boundary_geo: Set(payload.boundary_geo),
        photo: Set(payload.photo),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = model.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(services::farm_detail(&state.db, inserted).await?),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Farm ID")),
    request_body = FarmUpdate,
    responses((status = OK, body = Farm), (status = BAD_REQUEST), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "farms",
    summary = "Update a farm"
)]
pub async fn update_farm(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<FarmUpdate>,
) -> ApiResult<Json<Farm>> {
    payload.validate()?;
    let model = scope::load_farm_checked(&state.db, &principal, id).await?;

    // Moving the farm to another route requires scope on the target too
    if payload.route_id != model.route_id {
        scope::load_route_checked(&state.db, &principal, payload.route_id).await?;
    }

    let mut active = model.into_active_model();
    active.route_id = Set(payload.route_id);
    active.name = Set(payload.name);
    active.owner_name = Set(payload.owner_name);
    active.size_ha = Set(payload.size_ha);
    active.location = Set(payload.location);
    active.address = Set(payload.address);
    active.latitude = Set(payload.latitude);
    active.longitude = Set(payload.longitude);
    active.boundary_geo = Set(payload.boundary_geo);
    active.photo = Set(payload.photo);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(services::farm_detail(&state.db, updated).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Farm ID")),
    responses((status = NO_CONTENT), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "farms",
    summary = "Delete a farm and its crops, samples and reports"
)]
pub async fn delete_farm(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let model = scope::load_farm_checked(&state.db, &principal, id).await?;
    services::delete_farms_cascade(&state.db, &[model.id]).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Soil and water samples for one farm, in one payload
#[utoipa::path(
    get,
    path = "/{id}/samples",
    params(("id" = Uuid, Path, description = "Farm ID")),
    responses(
        (status = OK, description = "Soil and water samples for this farm"),
        (status = FORBIDDEN),
        (status = NOT_FOUND)
    ),
    tag = "farms",
    summary = "Get farm samples"
)]
pub async fn get_farm_samples(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let farm = scope::load_farm_checked(&state.db, &principal, id).await?;

    let soil: Vec<SoilSample> = soil_samples::Entity::find()
        .filter(soil_samples::Column::FarmId.eq(farm.id))
        .order_by_desc(soil_samples::Column::SampleDate)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|model| SoilSample::with_farm_name(model, farm.name.clone()))
        .collect();

    let water: Vec<WaterSample> = water_samples::Entity::find()
        .filter(water_samples::Column::FarmId.eq(farm.id))
        .order_by_desc(water_samples::Column::SampleDate)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|model| WaterSample::with_farm_name(model, farm.name.clone()))
        .collect();

    Ok(Json(json!({
        "soil_samples": soil,
        "water_samples": water,
    })))
}

/// All pest and disease reports for one farm
#[utoipa::path(
    get,
    path = "/{id}/pest_disease",
    params(("id" = Uuid, Path, description = "Farm ID")),
    responses(
        (status = OK, body = Vec<PestDiseaseReport>),
        (status = FORBIDDEN),
        (status = NOT_FOUND)
    ),
    tag = "farms",
    summary = "Get farm pest and disease reports"
)]
pub async fn get_farm_pest_disease(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<PestDiseaseReport>>> {
    let farm = scope::load_farm_checked(&state.db, &principal, id).await?;

    let reports: Vec<PestDiseaseReport> = pest_disease_reports::Entity::find()
        .filter(pest_disease_reports::Column::FarmId.eq(farm.id))
        .order_by_desc(pest_disease_reports::Column::ReportDate)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|model| PestDiseaseReport::with_farm_name(model, farm.name.clone()))
        .collect();

    Ok(Json(reports))
}

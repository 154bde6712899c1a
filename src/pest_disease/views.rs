use super::models::{
    self as pest_disease_reports, PestCategory, PestDiseaseReport, PestDiseaseReportCreate,
    PestDiseaseReportUpdate, Severity,
};
use crate::common::auth::{Principal, protect};
use crate::common::errors::{ApiError, ApiResult};
use crate::common::scope;
use crate::common::state::AppState;
use crate::farms::services as farm_services;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::Utc;
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
        .routes(routes!(get_all_reports, create_report))
        .routes(routes!(get_one_report, update_report, delete_report))
        .with_state(state.clone());

    protect(router, state, "pest-disease")
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportListParams {
    /// Restrict the listing to one farm
    pub farm: Option<Uuid>,
    pub category: Option<PestCategory>,
    pub severity: Option<Severity>,
}

#[utoipa::path(
    get,
    path = "/",
    params(ReportListParams),
    responses((status = OK, body = Vec<PestDiseaseReport>)),
    tag = "pest-disease",
    summary = "List visible pest and disease reports"
)]
pub async fn get_all_reports(
    State(state): State<AppState>,
    principal: Principal,
    Query(params): Query<ReportListParams>,
) -> ApiResult<Json<Vec<PestDiseaseReport>>> {
    let mut select =
        scope::pest_reports_for(&principal).order_by_desc(pest_disease_reports::Column::ReportDate);
    if let Some(farm_id) = params.farm {
        select = select.filter(pest_disease_reports::Column::FarmId.eq(farm_id));
    }
    if let Some(category) = params.category {
        select = select.filter(pest_disease_reports::Column::Category.eq(category));
    }
    if let Some(severity) = params.severity {
        select = select.filter(pest_disease_reports::Column::Severity.eq(severity));
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
                PestDiseaseReport::with_farm_name(model, farm_name)
            })
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses((status = OK, body = PestDiseaseReport), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "pest-disease",
    summary = "Get one pest or disease report"
)]
pub async fn get_one_report(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PestDiseaseReport>> {
    let model = pest_disease_reports::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("pest/disease report", id))?;
    let farm = scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;
    Ok(Json(PestDiseaseReport::with_farm_name(model, farm.name)))
}

#[utoipa::path(
    post,
    path = "/",
    request_body = PestDiseaseReportCreate,
    responses((status = CREATED, body = PestDiseaseReport), (status = BAD_REQUEST), (status = FORBIDDEN)),
    tag = "pest-disease",
    summary = "Record a pest or disease report on a visible farm"
)]
pub async fn create_report(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<PestDiseaseReportCreate>,
) -> ApiResult<(StatusCode, Json<PestDiseaseReport>)> {
    payload.validate()?;
    let farm = scope::load_farm_checked(&state.db, &principal, payload.farm_id).await?;

    let now = Utc::now();
    let model = pest_disease_reports::ActiveModel {
        id: Set(Uuid::new_v4()),
        farm_id: Set(payload.farm_id),
        report_date: Set(payload.report_date),
        category: Set(payload.category),
        name: Set(payload.name),
        severity: Set(payload.severity),
        description: Set(payload.description),
        location_lat: Set(payload.location_lat),
        location_lng: Set(payload.location_lng),
        photo: Set(payload.photo),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let inserted = model.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(PestDiseaseReport::with_farm_name(inserted, farm.name)),
    ))
}

#[utoipa::path(
    put,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    request_body = PestDiseaseReportUpdate,
    responses((status = OK, body = PestDiseaseReport), (status = BAD_REQUEST), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "pest-disease",
    summary = "Update a pest or disease report"
)]
pub async fn update_report(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(payload): Json<PestDiseaseReportUpdate>,
) -> ApiResult<Json<PestDiseaseReport>> {
    payload.validate()?;

    let model = pest_disease_reports::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("pest/disease report", id))?;
    scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;
    let farm = scope::load_farm_checked(&state.db, &principal, payload.farm_id).await?;

    let mut active = model.into_active_model();
    active.farm_id = Set(payload.farm_id);
    active.report_date = Set(payload.report_date);
    active.category = Set(payload.category);
    active.name = Set(payload.name);
    active.severity = Set(payload.severity);
    active.description = Set(payload.description);
    active.location_lat = Set(payload.location_lat);
    active.location_lng = Set(payload.location_lng);
    active.photo = Set(payload.photo);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(PestDiseaseReport::with_farm_name(updated, farm.name)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    params(("id" = Uuid, Path, description = "Report ID")),
    responses((status = NO_CONTENT), (status = FORBIDDEN), (status = NOT_FOUND)),
    tag = "pest-disease",
    summary = "Delete a pest or disease report"
)]
pub async fn delete_report(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let model = pest_disease_reports::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("pest/disease report", id))?;
    scope::load_farm_checked(&state.db, &principal, model.farm_id).await?;

    pest_disease_reports::Entity::delete_by_id(model.id)
        .exec(&state.db)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

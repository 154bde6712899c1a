use super::services;
use crate::common::auth::{Principal, protect};
use crate::common::errors::{ApiError, ApiResult};
use crate::common::state::AppState;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    let router = OpenApiRouter::new()
        .routes(routes!(export_csv))
        .with_state(state.clone());

    protect(router, state, "export")
}

/// Exportable entity collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Farms,
    SoilSamples,
    WaterSamples,
    PestDisease,
}

impl ExportKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "farms" => Some(Self::Farms),
            "soil-samples" => Some(Self::SoilSamples),
            "water-samples" => Some(Self::WaterSamples),
            "pest-disease" => Some(Self::PestDisease),
            _ => None,
        }
    }

    fn filename(self) -> &'static str {
        match self {
            Self::Farms => "farms.csv",
            Self::SoilSamples => "soil_samples.csv",
            Self::WaterSamples => "water_samples.csv",
            Self::PestDisease => "pest_disease_reports.csv",
        }
    }
}

#[utoipa::path(
    get,
    path = "/{kind}",
    params(
        ("kind" = String, Path, description = "One of: farms, soil-samples, water-samples, pest-disease")
    ),
    responses(
        (status = OK, description = "CSV export", content_type = "text/csv"),
        (status = BAD_REQUEST, description = "Unknown export kind"),
        (status = FORBIDDEN, description = "Caller is not an admin")
    ),
    tag = "export",
    summary = "Export an entity collection as CSV (admin only)"
)]
pub async fn export_csv(
    State(state): State<AppState>,
    principal: Principal,
    Path(kind): Path<String>,
) -> ApiResult<Response> {
    // Admin only: enumerators get a rejection, never a reduced row set
    if !principal.is_admin() {
        return Err(ApiError::forbidden("export", "survey data"));
    }

    let kind = ExportKind::parse(&kind).ok_or_else(|| {
        ApiError::validation(
            "kind",
            "Invalid export kind. Choose from: farms, soil-samples, water-samples, pest-disease",
        )
    })?;

    let body = match kind {
        ExportKind::Farms => services::farms_csv(&state.db).await?,
        ExportKind::SoilSamples => services::soil_samples_csv(&state.db).await?,
        ExportKind::WaterSamples => services::water_samples_csv(&state.db).await?,
        ExportKind::PestDisease => services::pest_disease_csv(&state.db).await?,
    };

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", kind.filename()),
        ),
    ];

    Ok((headers, body).into_response())
}

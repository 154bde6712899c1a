use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::errors::{ApiError, ApiResult};
use crate::soil_samples::models::validate_sample_date;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, ToSchema, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PestCategory {
    #[sea_orm(string_value = "pest")]
    Pest,
    #[sea_orm(string_value = "disease")]
    Disease,
}

impl std::fmt::Display for PestCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PestCategory::Pest => f.write_str("Pest"),
            PestCategory::Disease => f.write_str("Disease"),
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, ToSchema, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pest_disease_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub farm_id: Uuid,
    pub report_date: NaiveDate,
    pub category: PestCategory,
    /// Name of the pest or disease
    pub name: String,
    pub severity: Severity,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((9, 6)))", nullable)]
    pub location_lat: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((9, 6)))", nullable)]
    pub location_lng: Option<Decimal>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::farms::models::Entity",
        from = "Column::FarmId",
        to = "crate::farms::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Farms,
}

impl Related<crate::farms::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PestDiseaseReport {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub farm_name: String,
    pub report_date: NaiveDate,
    pub category: PestCategory,
    pub name: String,
    pub severity: Severity,
    pub description: Option<String>,
    pub location_lat: Option<Decimal>,
    pub location_lng: Option<Decimal>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PestDiseaseReport {
    pub fn with_farm_name(model: Model, farm_name: String) -> Self {
        let mut report = Self::from(model);
        report.farm_name = farm_name;
        report
    }
}

impl From<Model> for PestDiseaseReport {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            farm_id: model.farm_id,
            farm_name: String::new(),
            report_date: model.report_date,
            category: model.category,
            name: model.name,
            severity: model.severity,
            description: model.description,
            location_lat: model.location_lat,
            location_lng: model.location_lng,
            photo: model.photo,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PestDiseaseReportCreate {
    pub farm_id: Uuid,
    pub report_date: NaiveDate,
    pub category: PestCategory,
    pub name: String,
    pub severity: Severity,
    pub description: Option<String>,
    pub location_lat: Option<Decimal>,
    pub location_lng: Option<Decimal>,
    pub photo: Option<String>,
}

impl PestDiseaseReportCreate {
    pub fn validate(&self) -> ApiResult<()> {
        validate_report_fields(&self.name, self.report_date)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PestDiseaseReportUpdate {
    pub farm_id: Uuid,
    pub report_date: NaiveDate,
    pub category: PestCategory,
    pub name: String,
    pub severity: Severity,
    pub description: Option<String>,
    pub location_lat: Option<Decimal>,
    pub location_lng: Option<Decimal>,
    pub photo: Option<String>,
}

impl PestDiseaseReportUpdate {
    pub fn validate(&self) -> ApiResult<()> {
        validate_report_fields(&self.name, self.report_date)
    }
}

fn validate_report_fields(name: &str, report_date: NaiveDate) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("name", "Name must not be empty"));
    }
    validate_sample_date("report_date", report_date)
}

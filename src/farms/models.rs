use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::errors::{ApiError, ApiResult};
use crate::crops::models::Crop;

/// Agricultural land surveyed along a route.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "farms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub route_id: Uuid,
    pub name: String,
    pub owner_name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub size_ha: Decimal,
    #[sea_orm(column_type = "Text", nullable)]
    pub location: Option<String>,
    pub address: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 7)))", nullable)]
    pub latitude: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((10, 7)))", nullable)]
    pub longitude: Option<Decimal>,
    pub boundary_geo: Option<Json>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::routes::models::Entity",
        from = "Column::RouteId",
        to = "crate::routes::models::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Routes,
    #[sea_orm(has_many = "crate::crops::models::Entity")]
    Crops,
    #[sea_orm(has_many = "crate::soil_samples::models::Entity")]
    SoilSamples,
    #[sea_orm(has_many = "crate::water_samples::models::Entity")]
    WaterSamples,
    #[sea_orm(has_many = "crate::pest_disease::models::Entity")]
    PestDiseaseReports,
}

impl Related<crate::routes::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Routes.def()
    }
}

impl Related<crate::crops::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Crops.def()
    }
}

impl Related<crate::soil_samples::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SoilSamples.def()
    }
}

impl Related<crate::water_samples::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WaterSamples.def()
    }
}

impl Related<crate::pest_disease::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PestDiseaseReports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Detail representation: list fields plus boundary, photo and crops.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Farm {
    pub id: Uuid,
    pub route_id: Uuid,
    pub route_name: String,
    pub name: String,
    pub owner_name: String,
    pub size_ha: Decimal,
    pub location: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub boundary_geo: Option<serde_json::Value>,
    pub photo: Option<String>,
    pub soil_sample_count: u64,
    pub water_sample_count: u64,
    pub pest_disease_count: u64,
    pub crops: Vec<Crop>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FarmList {
    pub id: Uuid,
    pub route_id: Uuid,
    pub route_name: String,
    pub name: String,
    pub owner_name: String,
    pub size_ha: Decimal,
    pub location: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub soil_sample_count: u64,
    pub water_sample_count: u64,
    pub pest_disease_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FarmCreate {
    pub route_id: Uuid,
    pub name: String,
    pub owner_name: String,
    pub size_ha: Decimal,
    pub location: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub boundary_geo: Option<serde_json::Value>,
    pub photo: Option<String>,
}

impl FarmCreate {
    pub fn validate(&self) -> ApiResult<()> {
        validate_farm_fields(&self.name, &self.owner_name, self.size_ha)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FarmUpdate {
    pub route_id: Uuid,
    pub name: String,
    pub owner_name: String,
    pub size_ha: Decimal,
    pub location: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub boundary_geo: Option<serde_json::Value>,
    pub photo: Option<String>,
}

impl FarmUpdate {
    pub fn validate(&self) -> ApiResult<()> {
        validate_farm_fields(&self.name, &self.owner_name, self.size_ha)
    }
}

fn validate_farm_fields(name: &str, owner_name: &str, size_ha: Decimal) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("name", "Name must not be empty"));
    }
    if owner_name.trim().is_empty() {
        return Err(ApiError::validation(
            "owner_name",
            "Owner name must not be empty",
        ));
    }
    if size_ha <= Decimal::ZERO {
        return Err(ApiError::validation(
            "size_ha",
            "Size must be a positive number of hectares",
        ));
    }
    Ok(())
}

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::errors::{ApiError, ApiResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "crops")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub farm_id: Uuid,
    pub crop_type: String,
    pub variety: Option<String>,
    pub planting_date: NaiveDate,
    pub expected_harvest: Option<NaiveDate>,
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
pub struct Crop {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub crop_type: String,
    pub variety: Option<String>,
    pub planting_date: NaiveDate,
    pub expected_harvest: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Model> for Crop {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            farm_id: model.farm_id,
            crop_type: model.crop_type,
            variety: model.variety,
            planting_date: model.planting_date,
            expected_harvest: model.expected_harvest,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CropCreate {
    pub farm_id: Uuid,
    pub crop_type: String,
    pub variety: Option<String>,
    pub planting_date: NaiveDate,
    pub expected_harvest: Option<NaiveDate>,
}

impl CropCreate {
    pub fn validate(&self) -> ApiResult<()> {
        validate_crop_fields(&self.crop_type, self.planting_date, self.expected_harvest)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CropUpdate {
    pub farm_id: Uuid,
    pub crop_type: String,
    pub variety: Option<String>,
    pub planting_date: NaiveDate,
    pub expected_harvest: Option<NaiveDate>,
}

impl CropUpdate {
    pub fn validate(&self) -> ApiResult<()> {
        validate_crop_fields(&self.crop_type, self.planting_date, self.expected_harvest)
    }
}

fn validate_crop_fields(
    crop_type: &str,
    planting_date: NaiveDate,
    expected_harvest: Option<NaiveDate>,
) -> ApiResult<()> {
    if crop_type.trim().is_empty() {
        return Err(ApiError::validation("crop_type", "Crop type must not be empty"));
    }
    if let Some(harvest) = expected_harvest {
        if harvest < planting_date {
            return Err(ApiError::validation(
                "expected_harvest",
                "Expected harvest date cannot be before the planting date",
            ));
        }
    }
    Ok(())
}

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::errors::{ApiError, ApiResult};
use crate::soil_samples::models::{validate_ph, validate_sample_date};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "water_samples")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub farm_id: Uuid,
    pub sample_date: NaiveDate,
    /// Water source description (river, well, irrigation channel, ...)
    pub source: String,
    #[sea_orm(column_type = "Decimal(Some((4, 2)))")]
    pub ph: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 2)))", nullable)]
    pub turbidity: Option<Decimal>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
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
pub struct WaterSample {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub farm_name: String,
    pub sample_date: NaiveDate,
    pub source: String,
    pub ph: Decimal,
    pub turbidity: Option<Decimal>,
    pub notes: Option<String>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WaterSample {
    pub fn with_farm_name(model: Model, farm_name: String) -> Self {
        let mut sample = Self::from(model);
        sample.farm_name = farm_name;
        sample
    }
}

impl From<Model> for WaterSample {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            farm_id: model.farm_id,
            farm_name: String::new(),
            sample_date: model.sample_date,
            source: model.source,
            ph: model.ph,
            turbidity: model.turbidity,
            notes: model.notes,
            photo: model.photo,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WaterSampleCreate {
    pub farm_id: Uuid,
    pub sample_date: NaiveDate,
    pub source: String,
    pub ph: Decimal,
    pub turbidity: Option<Decimal>,
    pub notes: Option<String>,
    pub photo: Option<String>,
}

impl WaterSampleCreate {
    pub fn validate(&self) -> ApiResult<()> {
        validate_water_fields(self.sample_date, &self.source, self.ph, self.turbidity)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WaterSampleUpdate {
    pub farm_id: Uuid,
    pub sample_date: NaiveDate,
    pub source: String,
    pub ph: Decimal,
    pub turbidity: Option<Decimal>,
    pub notes: Option<String>,
    pub photo: Option<String>,
}

impl WaterSampleUpdate {
    pub fn validate(&self) -> ApiResult<()> {
        validate_water_fields(self.sample_date, &self.source, self.ph, self.turbidity)
    }
}

fn validate_water_fields(
    sample_date: NaiveDate,
    source: &str,
    ph: Decimal,
    turbidity: Option<Decimal>,
) -> ApiResult<()> {
    validate_sample_date("sample_date", sample_date)?;
    if source.trim().is_empty() {
        return Err(ApiError::validation(
            "source",
            "Water source description must not be empty",
        ));
    }
    validate_ph("ph", ph)?;
    if let Some(level) = turbidity {
        if level < Decimal::ZERO {
            return Err(ApiError::validation(
                "turbidity",
                "Turbidity cannot be negative",
            ));
        }
    }
    Ok(())
}

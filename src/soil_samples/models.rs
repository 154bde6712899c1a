use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::errors::{ApiError, ApiResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "soil_samples")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub farm_id: Uuid,
    pub sample_date: NaiveDate,
    #[sea_orm(column_type = "Decimal(Some((4, 2)))")]
    pub ph: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub moisture_pct: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))", nullable)]
    pub nutrient_n: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))", nullable)]
    pub nutrient_p: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((6, 2)))", nullable)]
    pub nutrient_k: Option<Decimal>,
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
pub struct SoilSample {
    pub id: Uuid,
    pub farm_id: Uuid,
    pub farm_name: String,
    pub sample_date: NaiveDate,
    pub ph: Decimal,
    pub moisture_pct: Option<Decimal>,
    pub nutrient_n: Option<Decimal>,
    pub nutrient_p: Option<Decimal>,
    pub nutrient_k: Option<Decimal>,
    pub notes: Option<String>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SoilSample {
    pub fn with_farm_name(model: Model, farm_name: String) -> Self {
        let mut sample = Self::from(model);
        sample.farm_name = farm_name;
        sample
    }
}

impl From<Model> for SoilSample {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            farm_id: model.farm_id,
            farm_name: String::new(),
            sample_date: model.sample_date,
            ph: model.ph,
            moisture_pct: model.moisture_pct,
            nutrient_n: model.nutrient_n,
            nutrient_p: model.nutrient_p,
            nutrient_k: model.nutrient_k,
            notes: model.notes,
            photo: model.photo,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SoilSampleCreate {
    pub farm_id: Uuid,
    pub sample_date: NaiveDate,
    pub ph: Decimal,
    pub moisture_pct: Option<Decimal>,
    pub nutrient_n: Option<Decimal>,
    pub nutrient_p: Option<Decimal>,
    pub nutrient_k: Option<Decimal>,
    pub notes: Option<String>,
    pub photo: Option<String>,
}

impl SoilSampleCreate {
    pub fn validate(&self) -> ApiResult<()> {
        validate_soil_fields(
            self.sample_date,
            self.ph,
            self.moisture_pct,
            self.nutrient_n,
            self.nutrient_p,
            self.nutrient_k,
        )
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SoilSampleUpdate {
    pub farm_id: Uuid,
    pub sample_date: NaiveDate,
    pub ph: Decimal,
    pub moisture_pct: Option<Decimal>,
    pub nutrient_n: Option<Decimal>,
    pub nutrient_p: Option<Decimal>,
    pub nutrient_k: Option<Decimal>,
    pub notes: Option<String>,
    pub photo: Option<String>,
}

impl SoilSampleUpdate {
    pub fn validate(&self) -> ApiResult<()> {
        validate_soil_fields(
            self.sample_date,
            self.ph,
            self.moisture_pct,
            self.nutrient_n,
            self.nutrient_p,
            self.nutrient_k,
        )
    }
}

pub(crate) fn validate_ph(field: &str, ph: Decimal) -> ApiResult<()> {
    if ph < Decimal::ZERO || ph > Decimal::from(14) {
        return Err(ApiError::validation(field, "pH must be between 0 and 14"));
    }
    Ok(())
}

pub(crate) fn validate_sample_date(field: &str, date: NaiveDate) -> ApiResult<()> {
    if date > Utc::now().date_naive() {
        return Err(ApiError::validation(field, "Date cannot be in the future"));
    }
    Ok(())
}

fn validate_soil_fields(
    sample_date: NaiveDate,
    ph: Decimal,
    moisture_pct: Option<Decimal>,
    nutrient_n: Option<Decimal>,
    nutrient_p: Option<Decimal>,
    nutrient_k: Option<Decimal>,
) -> ApiResult<()> {
    validate_sample_date("sample_date", sample_date)?;
    validate_ph("ph", ph)?;
    if let Some(moisture) = moisture_pct {
        if moisture < Decimal::ZERO || moisture > Decimal::ONE_HUNDRED {
            return Err(ApiError::validation(
                "moisture_pct",
                "Moisture must be between 0 and 100 percent",
            ));
        }
    }
    let nutrient_max = Decimal::from(999);
    for (field, value) in [
        ("nutrient_n", nutrient_n),
        ("nutrient_p", nutrient_p),
        ("nutrient_k", nutrient_k),
    ] {
        if let Some(level) = value {
            if level < Decimal::ZERO || level > nutrient_max {
                return Err(ApiError::validation(
                    field,
                    "Nutrient levels must be between 0 and 999",
                ));
            }
        }
    }
    Ok(())
}

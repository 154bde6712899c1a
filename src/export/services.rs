//! Tabular export: projects each entity collection to CSV with a fixed
//! column set per kind, rows in the entity's natural recency order. Dates
//! are `YYYY-MM-DD`, timestamps `YYYY-MM-DD HH:MM:SS`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveEnum, DatabaseConnection, EntityTrait, QueryOrder};
use std::collections::HashMap;
use uuid::Uuid;

use crate::common::errors::{ApiError, ApiResult};
use crate::farms::models as farms;
use crate::pest_disease::models as pest_disease_reports;
use crate::routes::models as routes;
use crate::soil_samples::models as soil_samples;
use crate::water_samples::models as water_samples;

fn timestamp(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn optional_decimal(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> ApiResult<String> {
    let bytes = writer.into_inner().map_err(|err| ApiError::Internal {
        message: err.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|err| ApiError::Internal {
        message: err.to_string(),
    })
}

fn csv_internal(err: csv::Error) -> ApiError {
    ApiError::Internal {
        message: err.to_string(),
    }
}

pub async fn farms_csv(db: &DatabaseConnection) -> ApiResult<String> {
    let models = farms::Entity::find()
        .order_by_desc(farms::Column::CreatedAt)
        .all(db)
        .await?;

    let route_names: HashMap<Uuid, String> = routes::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|route| (route.id, route.name))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "name",
            "ownerName",
            "location",
            "address",
            "sizeHa",
            "routeName",
            "latitude",
            "longitude",
            "createdAt",
        ])
        .map_err(csv_internal)?;

    for farm in models {
        writer
            .write_record([
                farm.id.to_string(),
                farm.name,
                farm.owner_name,
                farm.location.unwrap_or_default(),
                farm.address.unwrap_or_default(),
                farm.size_ha.to_string(),
                route_names.get(&farm.route_id).cloned().unwrap_or_default(),
                optional_decimal(farm.latitude),
                optional_decimal(farm.longitude),
                timestamp(farm.created_at),
            ])
            .map_err(csv_internal)?;
    }

    finish(writer)
}

pub async fn soil_samples_csv(db: &DatabaseConnection) -> ApiResult<String> {
    let models = soil_samples::Entity::find()
        .order_by_desc(soil_samples::Column::SampleDate)
        .all(db)
        .await?;

    let farm_ids: Vec<Uuid> = models.iter().map(|sample| sample.farm_id).collect();
    let farm_names = crate::farms::services::farm_names(db, &farm_ids).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "farmName",
            "sampleDate",
            "pH",
            "moisturePct",
            "nitrogen",
            "phosphorus",
            "potassium",
            "notes",
            "createdAt",
        ])
        .map_err(csv_internal)?;

    for sample in models {
        writer
            .write_record([
                sample.id.to_string(),
                farm_names
                    .get(&sample.farm_id)
                    .cloned()
                    .unwrap_or_default(),
                sample.sample_date.format("%Y-%m-%d").to_string(),
                sample.ph.to_string(),
                optional_decimal(sample.moisture_pct),
                optional_decimal(sample.nutrient_n),
                optional_decimal(sample.nutrient_p),
                optional_decimal(sample.nutrient_k),
                sample.notes.unwrap_or_default(),
                timestamp(sample.created_at),
            ])
            .map_err(csv_internal)?;
    }

    finish(writer)
}

pub async fn water_samples_csv(db: &DatabaseConnection) -> ApiResult<String> {
    let models = water_samples::Entity::find()
        .order_by_desc(water_samples::Column::SampleDate)
        .all(db)
        .await?;

    let farm_ids: Vec<Uuid> = models.iter().map(|sample| sample.farm_id).collect();
    let farm_names = crate::farms::services::farm_names(db, &farm_ids).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "farmName",
            "source",
            "sampleDate",
            "pH",
            "turbidity",
            "notes",
            "createdAt",
        ])
        .map_err(csv_internal)?;

    for sample in models {
        writer
            .write_record([
                sample.id.to_string(),
                farm_names
                    .get(&sample.farm_id)
                    .cloned()
                    .unwrap_or_default(),
                sample.source,
                sample.sample_date.format("%Y-%m-%d").to_string(),
                sample.ph.to_string(),
                optional_decimal(sample.turbidity),
                sample.notes.unwrap_or_default(),
                timestamp(sample.created_at),
            ])
            .map_err(csv_internal)?;
    }

    finish(writer)
}

pub async fn pest_disease_csv(db: &DatabaseConnection) -> ApiResult<String> {
    let models = pest_disease_reports::Entity::find()
        .order_by_desc(pest_disease_reports::Column::ReportDate)
        .all(db)
        .await?;

    let farm_ids: Vec<Uuid> = models.iter().map(|report| report.farm_id).collect();
    let farm_names = crate::farms::services::farm_names(db, &farm_ids).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record([
            "id",
            "farmName",
            "category",
            "name",
            "severity",
            "reportDate",
            "description",
            "createdAt",
        ])
        .map_err(csv_internal)?;

    for report in models {
        writer
            .write_record([
                report.id.to_string(),
                farm_names
                    .get(&report.farm_id)
                    .cloned()
                    .unwrap_or_default(),
                report.category.to_value(),
                report.name,
                report.severity.to_value(),
                report.report_date.format("%Y-%m-%d").to_string(),
                report.description.unwrap_or_default(),
                timestamp(report.created_at),
            ])
            .map_err(csv_internal)?;
    }

    finish(writer)
}

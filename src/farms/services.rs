use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use super::models::{self as farms, Farm, FarmList};
use crate::common::errors::ApiResult;
use crate::crops::models::{self as crops, Crop};
use crate::pest_disease::models as pest_disease_reports;
use crate::routes::models as routes;
use crate::soil_samples::models as soil_samples;
use crate::water_samples::models as water_samples;

#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationCounts {
    pub soil: u64,
    pub water: u64,
    pub pest_disease: u64,
}

/// Per-farm observation tallies for a page of farms, three grouped count
/// queries regardless of page size.
pub async fn observation_counts(
    db: &DatabaseConnection,
    farm_ids: &[Uuid],
) -> Result<HashMap<Uuid, ObservationCounts>, DbErr> {
    let mut counts: HashMap<Uuid, ObservationCounts> = farm_ids
        .iter()
        .map(|id| (*id, ObservationCounts::default()))
        .collect();
    if farm_ids.is_empty() {
        return Ok(counts);
    }

    let soil: Vec<(Uuid, i64)> = soil_samples::Entity::find()
        .select_only()
        .column(soil_samples::Column::FarmId)
        .column_as(soil_samples::Column::Id.count(), "count")
        .filter(soil_samples::Column::FarmId.is_in(farm_ids.iter().copied()))
        .group_by(soil_samples::Column::FarmId)
        .into_tuple()
        .all(db)
        .await?;
    for (farm_id, count) in soil {
        counts.entry(farm_id).or_default().soil = count.max(0) as u64;
    }

    let water: Vec<(Uuid, i64)> = water_samples::Entity::find()
        .select_only()
        .column(water_samples::Column::FarmId)
        .column_as(water_samples::Column::Id.count(), "count")
        .filter(water_samples::Column::FarmId.is_in(farm_ids.iter().copied()))
        .group_by(water_samples::Column::FarmId)
        .into_tuple()
        .all(db)
        .await?;
    for (farm_id, count) in water {
        counts.entry(farm_id).or_default().water = count.max(0) as u64;
    }

    let reports: Vec<(Uuid, i64)> = pest_disease_reports::Entity::find()
        .select_only()
        .column(pest_disease_reports::Column::FarmId)
        .column_as(pest_disease_reports::Column::Id.count(), "count")
        .filter(pest_disease_reports::Column::FarmId.is_in(farm_ids.iter().copied()))
        .group_by(pest_disease_reports::Column::FarmId)
        .into_tuple()
        .all(db)
        .await?;
    for (farm_id, count) in reports {
        counts.entry(farm_id).or_default().pest_disease = count.max(0) as u64;
    }

    Ok(counts)
}

/// Batched id → name lookup used wherever samples and reports are presented
/// with their farm.
pub async fn farm_names(
    db: &DatabaseConnection,
    farm_ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, DbErr> {
    if farm_ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(farms::Entity::find()
        .filter(farms::Column::Id.is_in(farm_ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|farm| (farm.id, farm.name))
        .collect())
}

pub async fn route_names(
    db: &DatabaseConnection,
    route_ids: &[Uuid],
) -> Result<HashMap<Uuid, String>, DbErr> {
    if route_ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(routes::Entity::find()
        .filter(routes::Column::Id.is_in(route_ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|route| (route.id, route.name))
        .collect())
}

pub async fn enrich_farm_list(
    db: &DatabaseConnection,
    models: Vec<farms::Model>,
) -> ApiResult<Vec<FarmList>> {
    let farm_ids: Vec<Uuid> = models.iter().map(|model| model.id).collect();
    let counts = observation_counts(db, &farm_ids).await?;

    let route_ids: Vec<Uuid> = models
        .iter()
        .map(|model| model.route_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let names = route_names(db, &route_ids).await?;

    Ok(models
        .into_iter()
        .map(|model| {
            let tallies = counts.get(&model.id).copied().unwrap_or_default();
            FarmList {
                id: model.id,
                route_id: model.route_id,
                route_name: names.get(&model.route_id).cloned().unwrap_or_default(),
                name: model.name,
                owner_name: model.owner_name,
                size_ha: model.size_ha,
                location: model.location,
                address: model.address,
                latitude: model.latitude,
                longitude: model.longitude,
                soil_sample_count: tallies.soil,
                water_sample_count: tallies.water,
                pest_disease_count: tallies.pest_disease,
                created_at: model.created_at,
                updated_at: model.updated_at,
            }
        })
        .collect())
}

/// Detail representation: the list fields plus boundary, photo, and the
/// farm's crops ordered by planting date.
pub async fn farm_detail(db: &DatabaseConnection, model: farms::Model) -> ApiResult<Farm> {
    let counts = observation_counts(db, &[model.id]).await?;
    let tallies = counts.get(&model.id).copied().unwrap_or_default();

    let names = route_names(db, &[model.route_id]).await?;

    let farm_crops: Vec<Crop> = crops::Entity::find()
        .filter(crops::Column::FarmId.eq(model.id))
        .order_by_desc(crops::Column::PlantingDate)
        .all(db)
        .await?
        .into_iter()
        .map(Crop::from)
        .collect();

    Ok(Farm {
        id: model.id,
        route_id: model.route_id,
        route_name: names.get(&model.route_id).cloned().unwrap_or_default(),
        name: model.name,
        owner_name: model.owner_name,
        size_ha: model.size_ha,
        location: model.location,
        address: model.address,
        latitude: model.latitude,
        longitude: model.longitude,
        boundary_geo: model.boundary_geo,
        photo: model.photo,
        soil_sample_count: tallies.soil,
        water_sample_count: tallies.water,
        pest_disease_count: tallies.pest_disease,
        crops: farm_crops,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

/// Delete farms and their crops, samples and reports, children first.
pub async fn delete_farms_cascade(
    db: &DatabaseConnection,
    farm_ids: &[Uuid],
) -> Result<(), DbErr> {
    if farm_ids.is_empty() {
        return Ok(());
    }

    crops::Entity::delete_many()
        .filter(crops::Column::FarmId.is_in(farm_ids.iter().copied()))
        .exec(db)
        .await?;
    soil_samples::Entity::delete_many()
        .filter(soil_samples::Column::FarmId.is_in(farm_ids.iter().copied()))
        .exec(db)
        .await?;
    water_samples::Entity::delete_many()
        .filter(water_samples::Column::FarmId.is_in(farm_ids.iter().copied()))
        .exec(db)
        .await?;
    pest_disease_reports::Entity::delete_many()
        .filter(pest_disease_reports::Column::FarmId.is_in(farm_ids.iter().copied()))
        .exec(db)
        .await?;

    farms::Entity::delete_many()
        .filter(farms::Column::Id.is_in(farm_ids.iter().copied()))
        .exec(db)
        .await?;

    Ok(())
}

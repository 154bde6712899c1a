use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect,
};
use uuid::Uuid;

use super::models::{self as routes, Route};
use crate::common::errors::{ApiError, ApiResult};
use crate::farms::models as farms;
use crate::farms::services as farm_services;
use crate::pest_disease::models as pest_disease_reports;
use crate::soil_samples::models as soil_samples;
use crate::users::models::{self as users, UserRole};
use crate::water_samples::models as water_samples;

/// Farm and completion tallies for one route.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteProgress {
    pub farm_count: u64,
    pub completed_farms: u64,
}

impl RouteProgress {
    pub fn percent(&self) -> u8 {
        progress_percent(self.completed_farms, self.farm_count)
    }
}

/// `floor(100 * completed / total)`; a route with no farms reads as 0 rather
/// than erroring on the division.
pub fn progress_percent(completed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    u8::try_from((completed * 100) / total).unwrap_or(100)
}

/// Batched progress for a set of routes: one query for the farms, one per
/// observation kind for the farm-id sets holding data. No per-farm round
/// trips, so the cost stays flat as farm counts grow.
pub async fn progress_for_routes(
    db: &DatabaseConnection,
    route_ids: &[Uuid],
) -> Result<HashMap<Uuid, RouteProgress>, DbErr> {
    let mut progress: HashMap<Uuid, RouteProgress> = route_ids
        .iter()
        .map(|id| (*id, RouteProgress::default()))
        .collect();
    if route_ids.is_empty() {
        return Ok(progress);
    }

    let farm_rows: Vec<(Uuid, Uuid)> = farms::Entity::find()
        .select_only()
        .column(farms::Column::Id)
        .column(farms::Column::RouteId)
        .filter(farms::Column::RouteId.is_in(route_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;

    let farm_ids: Vec<Uuid> = farm_rows.iter().map(|(id, _)| *id).collect();
    let observed = observed_farm_ids(db, &farm_ids).await?;

    for (farm_id, route_id) in farm_rows {
        let entry = progress.entry(route_id).or_default();
        entry.farm_count += 1;
        if observed.contains(&farm_id) {
            entry.completed_farms += 1;
        }
    }

    Ok(progress)
}

/// Farms with at least one soil sample, water sample, or pest/disease report.
/// Any recorded observation marks the farm as surveyed; this definition is a
/// policy choice kept in one place.
async fn observed_farm_ids(
    db: &DatabaseConnection,
    farm_ids: &[Uuid],
) -> Result<HashSet<Uuid>, DbErr> {
    let mut observed = HashSet::new();
    if farm_ids.is_empty() {
        return Ok(observed);
    }

    let soil: Vec<Uuid> = soil_samples::Entity::find()
        .select_only()
        .column(soil_samples::Column::FarmId)
        .distinct()
        .filter(soil_samples::Column::FarmId.is_in(farm_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;
    observed.extend(soil);

    let water: Vec<Uuid> = water_samples::Entity::find()
        .select_only()
        .column(water_samples::Column::FarmId)
        .distinct()
        .filter(water_samples::Column::FarmId.is_in(farm_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;
    observed.extend(water);

    let reports: Vec<Uuid> = pest_disease_reports::Entity::find()
        .select_only()
        .column(pest_disease_reports::Column::FarmId)
        .distinct()
        .filter(pest_disease_reports::Column::FarmId.is_in(farm_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;
    observed.extend(reports);

    Ok(observed)
}

/// The API representation carries the assignee's name and the progress
/// tallies; both are resolved with batched lookups across the whole page.
pub async fn enrich_routes(
    db: &DatabaseConnection,
    models: Vec<routes::Model>,
) -> ApiResult<Vec<Route>> {
    let route_ids: Vec<Uuid> = models.iter().map(|model| model.id).collect();
    let progress = progress_for_routes(db, &route_ids).await?;

    let user_ids: Vec<Uuid> = models
        .iter()
        .map(|model| model.assigned_to)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let user_names: HashMap<Uuid, String> = users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|user| (user.id, user.full_name()))
        .collect();

    Ok(models
        .into_iter()
        .map(|model| {
            let tallies = progress.get(&model.id).copied().unwrap_or_default();
            Route {
                id: model.id,
                name: model.name,
                assigned_to: model.assigned_to,
                assigned_to_name: user_names
                    .get(&model.assigned_to)
                    .cloned()
                    .unwrap_or_default(),
                date_assigned: model.date_assigned,
                status: model.status,
                farm_count: tallies.farm_count,
                completed_farms: tallies.completed_farms,
                progress: tallies.percent(),
                created_at: model.created_at,
                updated_at: model.updated_at,
            }
        })
        .collect())
}

pub async fn enrich_route(db: &DatabaseConnection, model: routes::Model) -> ApiResult<Route> {
    let mut enriched = enrich_routes(db, vec![model]).await?;
    enriched
        .pop()
        .ok_or_else(|| ApiError::Internal {
            message: "route enrichment returned no rows".to_string(),
        })
}

/// Every route must be assigned to an existing enumerator.
pub async fn require_enumerator(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> ApiResult<users::Model> {
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::validation("assigned_to", "Assigned user does not exist"))?;
    if user.role != UserRole::Enumerator {
        return Err(ApiError::validation(
            "assigned_to",
            "Routes can only be assigned to enumerators",
        ));
    }
    Ok(user)
}

/// Delete routes and their farm subtrees, children first.
pub async fn delete_routes_cascade(
    db: &DatabaseConnection,
    route_ids: &[Uuid],
) -> Result<(), DbErr> {
    if route_ids.is_empty() {
        return Ok(());
    }

    let farm_ids: Vec<Uuid> = farms::Entity::find()
        .select_only()
        .column(farms::Column::Id)
        .filter(farms::Column::RouteId.is_in(route_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await?;
    farm_services::delete_farms_cascade(db, &farm_ids).await?;

    routes::Entity::delete_many()
        .filter(routes::Column::Id.is_in(route_ids.iter().copied()))
        .exec(db)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::progress_percent;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0)]
    #[case(0, 4, 0)]
    #[case(1, 2, 50)]
    #[case(1, 3, 33)]
    #[case(2, 3, 66)]
    #[case(3, 3, 100)]
    #[case(5, 5, 100)]
    fn progress_is_floored_percentage(
        #[case] completed: u64,
        #[case] total: u64,
        #[case] expected: u8,
    ) {
        assert_eq!(progress_percent(completed, total), expected);
    }
}

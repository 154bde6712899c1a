//! Dashboard aggregation. Everything here reads through the scope resolver
//! and runs a small, fixed number of batched queries regardless of how much
//! data sits underneath: counts are grouped in the store, recency lists are
//! LIMITed, and names are resolved with one batched lookup at the end.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use super::models::{
    ActivityItem, ActivityKind, CategoryCounts, DashboardSummary, DashboardUser, FarmStats,
    PestDiseaseStats, PestDiseaseSummary, RouteFarmCount, RouteStats, SampleStats, SampleSummary,
    SamplingStats, SeverityCounts,
};
use crate::common::auth::Principal;
use crate::common::errors::ApiResult;
use crate::common::scope;
use crate::farms::models as farms;
use crate::farms::services as farm_services;
use crate::pest_disease::models::{self as pest_disease_reports, PestCategory, Severity};
use crate::routes::models::RouteStatus;
use crate::soil_samples::models as soil_samples;
use crate::water_samples::models as water_samples;

const LATEST_LIMIT: u64 = 5;
const ACTIVITY_LIMIT: usize = 10;

/// Read-only summary of the principal's visible scope. An empty scope yields
/// zeros and empty lists.
pub async fn summarize(db: &DatabaseConnection, principal: &Principal) -> ApiResult<DashboardSummary> {
    // Routes are few per scope; one fetch serves both the status counts and
    // the per-route name lookup for the farm breakdown.
    let visible_routes = scope::routes_for(principal).all(db).await?;
    let mut route_stats = RouteStats {
        total: visible_routes.len() as u64,
        ..RouteStats::default()
    };
    for route in &visible_routes {
        match route.status {
            RouteStatus::Pending => route_stats.pending += 1,
            RouteStatus::InProgress => route_stats.in_progress += 1,
            RouteStatus::Complete => route_stats.complete += 1,
        }
    }
    let route_names: HashMap<Uuid, &str> = visible_routes
        .iter()
        .map(|route| (route.id, route.name.as_str()))
        .collect();

    // Farm counts grouped by owning route in the store
    let farm_counts: Vec<(Uuid, i64)> = scope::farms_for(principal)
        .select_only()
        .column(farms::Column::RouteId)
        .column_as(farms::Column::Id.count(), "count")
        .group_by(farms::Column::RouteId)
        .into_tuple()
        .all(db)
        .await?;
    let mut by_route: Vec<RouteFarmCount> = farm_counts
        .into_iter()
        .map(|(route_id, count)| RouteFarmCount {
            route_id,
            name: route_names
                .get(&route_id)
                .map(|name| (*name).to_string())
                .unwrap_or_default(),
            count: count.max(0) as u64,
        })
        .collect();
    by_route.sort_by(|a, b| a.name.cmp(&b.name));
    let farm_stats = FarmStats {
        total: by_route.iter().map(|entry| entry.count).sum(),
        by_route,
    };

    let recent_farms = scope::farms_for(principal)
        .order_by_desc(farms::Column::CreatedAt)
        .limit(LATEST_LIMIT)
        .all(db)
        .await?;

    let soil_total = scope::soil_samples_for(principal).count(db).await?;
    let recent_soil = scope::soil_samples_for(principal)
        .order_by_desc(soil_samples::Column::CreatedAt)
        .limit(LATEST_LIMIT)
        .all(db)
        .await?;

    let water_total = scope::water_samples_for(principal).count(db).await?;
    let recent_water = scope::water_samples_for(principal)
        .order_by_desc(water_samples::Column::CreatedAt)
        .limit(LATEST_LIMIT)
        .all(db)
        .await?;

    let report_total = scope::pest_reports_for(principal).count(db).await?;
    let category_counts: Vec<(PestCategory, i64)> = scope::pest_reports_for(principal)
        .select_only()
        .column(pest_disease_reports::Column::Category)
        .column_as(pest_disease_reports::Column::Id.count(), "count")
        .group_by(pest_disease_reports::Column::Category)
        .into_tuple()
        .all(db)
        .await?;
    let severity_counts: Vec<(Severity, i64)> = scope::pest_reports_for(principal)
        .select_only()
        .column(pest_disease_reports::Column::Severity)
        .column_as(pest_disease_reports::Column::Id.count(), "count")
        .group_by(pest_disease_reports::Column::Severity)
        .into_tuple()
        .all(db)
        .await?;
    let recent_reports = scope::pest_reports_for(principal)
        .order_by_desc(pest_disease_reports::Column::CreatedAt)
        .limit(LATEST_LIMIT)
        .all(db)
        .await?;

    let mut by_category = CategoryCounts::default();
    for (category, count) in category_counts {
        let count = count.max(0) as u64;
        match category {
            PestCategory::Pest => by_category.pest = count,
            PestCategory::Disease => by_category.disease = count,
        }
    }
    let mut by_severity = SeverityCounts::default();
    for (severity, count) in severity_counts {
        let count = count.max(0) as u64;
        match severity {
            Severity::Low => by_severity.low = count,
            Severity::Medium => by_severity.medium = count,
            Severity::High => by_severity.high = count,
        }
    }

    // One batched lookup for the farm names the recency lists mention
    let farm_ids: Vec<Uuid> = recent_soil
        .iter()
        .map(|sample| sample.farm_id)
        .chain(recent_water.iter().map(|sample| sample.farm_id))
        .chain(recent_reports.iter().map(|report| report.farm_id))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let farm_names = farm_services::farm_names(db, &farm_ids).await?;
    let farm_name = |farm_id: &Uuid| farm_names.get(farm_id).cloned().unwrap_or_default();

    let sampling = SamplingStats {
        soil: SampleStats {
            total: soil_total,
            latest: recent_soil
                .iter()
                .map(|sample| SampleSummary {
                    id: sample.id,
                    farm_name: farm_name(&sample.farm_id),
                    sample_date: sample.sample_date,
                    ph: sample.ph,
                })
                .collect(),
        },
        water: SampleStats {
            total: water_total,
            latest: recent_water
                .iter()
                .map(|sample| SampleSummary {
                    id: sample.id,
                    farm_name: farm_name(&sample.farm_id),
                    sample_date: sample.sample_date,
                    ph: sample.ph,
                })
                .collect(),
        },
    };

    let pest_disease = PestDiseaseStats {
        total: report_total,
        by_category,
        by_severity,
        latest: recent_reports
            .iter()
            .map(|report| PestDiseaseSummary {
                id: report.id,
                farm_name: farm_name(&report.farm_id),
                report_date: report.report_date,
                name: report.name.clone(),
                category: report.category,
                severity: report.severity,
            })
            .collect(),
    };

    let activity = build_activity_feed(&recent_farms, &recent_soil, &recent_water, &recent_reports, &farm_names);

    Ok(DashboardSummary {
        user: DashboardUser {
            id: principal.user_id,
            username: principal.username.clone(),
            name: principal.display_name.clone(),
            role: principal.role,
        },
        routes: route_stats,
        farms: farm_stats,
        sampling,
        pest_disease,
        activity,
    })
}

/// Union of the per-kind recency lists, newest first, truncated. The sort is
/// stable, so equal timestamps keep the union insertion order (farms, soil,
/// water, reports), deterministic for a fixed input set.
fn build_activity_feed(
    recent_farms: &[farms::Model],
    recent_soil: &[soil_samples::Model],
    recent_water: &[water_samples::Model],
    recent_reports: &[pest_disease_reports::Model],
    farm_names: &HashMap<Uuid, String>,
) -> Vec<ActivityItem> {
    let farm_name =
        |farm_id: &Uuid| -> String { farm_names.get(farm_id).cloned().unwrap_or_default() };

    let mut activity: Vec<ActivityItem> = Vec::new();

    for farm in recent_farms {
        activity.push(ActivityItem {
            kind: ActivityKind::Farm,
            id: farm.id,
            farm_name: None,
            date: farm.created_at,
            summary: format!("Added Farm: {}", farm.name),
        });
    }
    for sample in recent_soil {
        let name = farm_name(&sample.farm_id);
        activity.push(ActivityItem {
            kind: ActivityKind::SoilSample,
            id: sample.id,
            farm_name: Some(name.clone()),
            date: sample.created_at,
            summary: format!("Soil Sample: {name}"),
        });
    }
    for sample in recent_water {
        let name = farm_name(&sample.farm_id);
        activity.push(ActivityItem {
            kind: ActivityKind::WaterSample,
            id: sample.id,
            farm_name: Some(name.clone()),
            date: sample.created_at,
            summary: format!("Water Sample: {name}"),
        });
    }
    for report in recent_reports {
        let name = farm_name(&report.farm_id);
        activity.push(ActivityItem {
            kind: ActivityKind::PestDisease,
            id: report.id,
            farm_name: Some(name.clone()),
            date: report.created_at,
            summary: format!("{} Report: {} on {}", report.category, report.name, name),
        });
    }

    activity.sort_by(|a, b| b.date.cmp(&a.date));
    activity.truncate(ACTIVITY_LIMIT);
    activity
}

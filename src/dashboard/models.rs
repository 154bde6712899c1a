use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pest_disease::models::{PestCategory, Severity};
use crate::users::models::UserRole;

/// Role-scoped snapshot of everything the caller can see.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummary {
    pub user: DashboardUser,
    pub routes: RouteStats,
    pub farms: FarmStats,
    pub sampling: SamplingStats,
    pub pest_disease: PestDiseaseStats,
    pub activity: Vec<ActivityItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardUser {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RouteStats {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub complete: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FarmStats {
    pub total: u64,
    /// Farm counts per owning route, ordered by route name
    pub by_route: Vec<RouteFarmCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RouteFarmCount {
    pub route_id: Uuid,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SamplingStats {
    pub soil: SampleStats,
    pub water: SampleStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SampleStats {
    pub total: u64,
    pub latest: Vec<SampleSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SampleSummary {
    pub id: Uuid,
    pub farm_name: String,
    pub sample_date: NaiveDate,
    pub ph: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PestDiseaseStats {
    pub total: u64,
    pub by_category: CategoryCounts,
    pub by_severity: SeverityCounts,
    pub latest: Vec<PestDiseaseSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CategoryCounts {
    pub pest: u64,
    pub disease: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SeverityCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PestDiseaseSummary {
    pub id: Uuid,
    pub farm_name: String,
    pub report_date: NaiveDate,
    pub name: String,
    pub category: PestCategory,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Farm,
    SoilSample,
    WaterSample,
    PestDisease,
}

/// One line in the recent-activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub id: Uuid,
    pub farm_name: Option<String>,
    pub date: DateTime<Utc>,
    pub summary: String,
}

//! Scope resolution: the single visibility predicate applied to every read
//! and write. Admins see the whole store; enumerators see the routes
//! assigned to them and, transitively, the farms, crops, samples and
//! reports underneath those routes.

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait, Select,
};
use uuid::Uuid;

use crate::common::auth::Principal;
use crate::common::errors::{ApiError, ApiResult};
use crate::crops::models as crops;
use crate::farms::models as farms;
use crate::pest_disease::models as pest_disease_reports;
use crate::routes::models as routes;
use crate::soil_samples::models as soil_samples;
use crate::users::models::UserRole;
use crate::water_samples::models as water_samples;

pub fn routes_for(principal: &Principal) -> Select<routes::Entity> {
    let select = routes::Entity::find();
    match principal.role {
        UserRole::Admin => select,
        UserRole::Enumerator => {
            select.filter(routes::Column::AssignedTo.eq(principal.user_id))
        }
    }
}

pub fn farms_for(principal: &Principal) -> Select<farms::Entity> {
    let select = farms::Entity::find();
    match principal.role {
        UserRole::Admin => select,
        UserRole::Enumerator => select
            .join(JoinType::InnerJoin, farms::Relation::Routes.def())
            .filter(routes::Column::AssignedTo.eq(principal.user_id)),
    }
}

pub fn crops_for(principal: &Principal) -> Select<crops::Entity> {
    let select = crops::Entity::find();
    match principal.role {
        UserRole::Admin => select,
        UserRole::Enumerator => select
            .join(JoinType::InnerJoin, crops::Relation::Farms.def())
            .join(JoinType::InnerJoin, farms::Relation::Routes.def())
            .filter(routes::Column::AssignedTo.eq(principal.user_id)),
    }
}

pub fn soil_samples_for(principal: &Principal) -> Select<soil_samples::Entity> {
    let select = soil_samples::Entity::find();
    match principal.role {
        UserRole::Admin => select,
        UserRole::Enumerator => select
            .join(JoinType::InnerJoin, soil_samples::Relation::Farms.def())
            .join(JoinType::InnerJoin, farms::Relation::Routes.def())
            .filter(routes::Column::AssignedTo.eq(principal.user_id)),
    }
}

pub fn water_samples_for(principal: &Principal) -> Select<water_samples::Entity> {
    let select = water_samples::Entity::find();
    match principal.role {
        UserRole::Admin => select,
        UserRole::Enumerator => select
            .join(JoinType::InnerJoin, water_samples::Relation::Farms.def())
            .join(JoinType::InnerJoin, farms::Relation::Routes.def())
            .filter(routes::Column::AssignedTo.eq(principal.user_id)),
    }
}

pub fn pest_reports_for(principal: &Principal) -> Select<pest_disease_reports::Entity> {
    let select = pest_disease_reports::Entity::find();
    match principal.role {
        UserRole::Admin => select,
        UserRole::Enumerator => select
            .join(
                JoinType::InnerJoin,
                pest_disease_reports::Relation::Farms.def(),
            )
            .join(JoinType::InnerJoin, farms::Relation::Routes.def())
            .filter(routes::Column::AssignedTo.eq(principal.user_id)),
    }
}

/// Whether the principal may read or mutate this route. Out-of-scope access
/// is an explicit authorization rejection, never masked as a not-found.
pub fn ensure_route_access(principal: &Principal, route: &routes::Model) -> ApiResult<()> {
    if principal.is_admin() || route.assigned_to == principal.user_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("access", "route"))
    }
}

/// Resolve a route id for a scoped read or mutation: missing id is a
/// not-found, an existing route outside the principal's scope is forbidden.
pub async fn load_route_checked(
    db: &DatabaseConnection,
    principal: &Principal,
    route_id: Uuid,
) -> ApiResult<routes::Model> {
    let route = routes::Entity::find_by_id(route_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("route", route_id))?;
    ensure_route_access(principal, &route)?;
    Ok(route)
}

/// Resolve a farm id the same way; the check rides on the farm's route.
pub async fn load_farm_checked(
    db: &DatabaseConnection,
    principal: &Principal,
    farm_id: Uuid,
) -> ApiResult<farms::Model> {
    let farm = farms::Entity::find_by_id(farm_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("farm", farm_id))?;

    if principal.is_admin() {
        return Ok(farm);
    }

    let route = routes::Entity::find_by_id(farm.route_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::Internal {
            message: format!("farm {} references missing route {}", farm.id, farm.route_id),
        })?;

    if route.assigned_to == principal.user_id {
        Ok(farm)
    } else {
        Err(ApiError::forbidden("access", "farm"))
    }
}

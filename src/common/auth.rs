use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_keycloak_auth::decode::KeycloakToken;
use axum_keycloak_auth::{PassthroughMode, layer::KeycloakAuthLayer};
use sea_orm::EntityTrait;
use utoipa_axum::router::OpenApiRouter;
use uuid::Uuid;

use crate::common::errors::ApiError;
use crate::common::state::AppState;
use crate::users::models::{self as users, UserRole};

/// Realm role granting API access through Keycloak.
pub const ADMIN_ROLE: &str = "agrisurvey-admin";

/// Keycloak realm roles. These only type the authentication layer; the
/// application role (admin/enumerator) always comes from the users table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Role {
    Administrator,
    Unknown(String),
}

impl axum_keycloak_auth::role::Role for Role {}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Administrator => f.write_str(ADMIN_ROLE),
            Role::Unknown(unknown) => f.write_fmt(format_args!("Unknown role: {unknown}")),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        if value == ADMIN_ROLE {
            Role::Administrator
        } else {
            Role::Unknown(value)
        }
    }
}

/// Wrap a module router with the Keycloak authentication layer when an
/// instance is configured. Authorization stays with the scope resolver; this
/// layer only authenticates.
pub fn protect(router: OpenApiRouter, state: &AppState, resource: &str) -> OpenApiRouter {
    if let Some(instance) = state.keycloak_auth_instance.clone() {
        router.layer(
            KeycloakAuthLayer::<Role>::builder()
                .instance(instance)
                .passthrough_mode(PassthroughMode::Block)
                .persist_raw_claims(false)
                .expected_audiences(vec![String::from("account")])
                .required_roles(vec![])
                .build(),
        )
    } else {
        if !state.config.tests_running {
            tracing::warn!("{resource} router is running without Keycloak protection");
        }
        router
    }
}

/// The authenticated actor issuing a request: an identity plus the role the
/// store has on record for it. Every scoped query and mutation goes through
/// this.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: UserRole,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = if state.keycloak_auth_instance.is_some() {
            // The auth layer has already validated the token; its subject is
            // the user id.
            let token = parts
                .extensions
                .get::<KeycloakToken<Role>>()
                .ok_or(ApiError::Unauthenticated)?;
            Uuid::parse_str(&token.subject).map_err(|_| ApiError::Unauthenticated)?
        } else {
            // Keycloak disabled (tests, local development): identity comes
            // from a header instead.
            parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| Uuid::parse_str(value).ok())
                .ok_or(ApiError::Unauthenticated)?
        };

        let user = users::Entity::find_by_id(user_id)
            .one(&state.db)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        Ok(Principal {
            user_id: user.id,
            username: user.username.clone(),
            display_name: user.full_name(),
            role: user.role,
        })
    }
}

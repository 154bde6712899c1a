use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub db_url: Option<String>,
    pub app_name: String,
    pub keycloak_ui_id: String,
    pub keycloak_url: String,
    pub keycloak_realm: String,
    pub deployment: String,
    pub admin_role: String,
    pub tests_running: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok(); // Load from .env file if available
        let db_url = env::var("DB_URL").ok().or_else(|| {
            Some(format!(
                "{}://{}:{}@{}:{}/{}",
                env::var("DB_PREFIX").unwrap_or_else(|_| "postgresql".to_string()),
                env::var("DB_USER").expect("DB_USER must be set"),
                env::var("DB_PASSWORD").expect("DB_PASSWORD must be set"),
                env::var("DB_HOST").expect("DB_HOST must be set"),
                env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string()),
                env::var("DB_NAME").expect("DB_NAME must be set"),
            ))
        });

        Config {
            app_name: env::var("APP_NAME").expect("APP_NAME must be set"),
            keycloak_ui_id: env::var("KEYCLOAK_UI_ID").expect("KEYCLOAK_UI_ID must be set"),
            keycloak_url: env::var("KEYCLOAK_URL").expect("KEYCLOAK_URL must be set"),
            keycloak_realm: env::var("KEYCLOAK_REALM").expect("KEYCLOAK_REALM must be set"),
            deployment: env::var("DEPLOYMENT")
                .expect("DEPLOYMENT must be set, this can be local, dev, stage, or prod"),
            admin_role: crate::common::auth::ADMIN_ROLE.to_string(),
            tests_running: false,
            db_url,
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            app_name: "agrisurvey-api-test".to_string(),
            keycloak_ui_id: "test-ui".to_string(),
            keycloak_url: String::new(),
            keycloak_realm: "test-realm".to_string(),
            deployment: "test".to_string(),
            admin_role: crate::common::auth::ADMIN_ROLE.to_string(),
            tests_running: true,
            db_url: None,
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::router::build_router;
    use crate::users::models::{self as users, UserRole};
    use axum::Router;
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
    use uuid::Uuid;

    /// Fresh in-memory SQLite database per test, with the full schema applied.
    pub async fn setup_test_db() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
        // A single long-lived connection keeps the in-memory database alive
        // for the whole test.
        options.max_connections(1).min_connections(1);

        let db = Database::connect(options)
            .await
            .expect("Failed to connect to test database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run database migrations");

        db
    }

    pub async fn setup_test_app() -> (Router, DatabaseConnection) {
        let db = setup_test_db().await;
        let config = Config::for_tests();
        (build_router(&db, &config), db)
    }

    /// Drive the router like the HTTP layer would, authenticating as the
    /// given user via the `x-user-id` header.
    pub async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        user_id: Option<Uuid>,
        body: Option<serde_json::Value>,
    ) -> (axum::http::StatusCode, serde_json::Value) {
        use axum::body::{Body, to_bytes};
        use tower::ServiceExt;

        let mut builder = axum::http::Request::builder().method(method).uri(uri);
        if let Some(user_id) = user_id {
            builder = builder.header("x-user-id", user_id.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body: serde_json::Value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::json!({"raw": String::from_utf8_lossy(&bytes)}));
        (status, body)
    }

    /// POST a payload and expect a created entity back.
    pub async fn api_create(
        app: &Router,
        user_id: Uuid,
        endpoint: &str,
        body: serde_json::Value,
    ) -> serde_json::Value {
        let (status, payload) = send(app, "POST", endpoint, Some(user_id), Some(body)).await;
        assert_eq!(
            status,
            axum::http::StatusCode::CREATED,
            "Failed to create via {endpoint}: {payload:?}"
        );
        payload
    }

    /// Insert a user directly into the store. Requests then authenticate as
    /// this user via the `x-user-id` header (Keycloak is disabled in tests).
    pub async fn create_test_user(
        db: &DatabaseConnection,
        username: &str,
        role: UserRole,
    ) -> Uuid {
        let now = Utc::now();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        };
        user.insert(db)
            .await
            .expect("Failed to insert test user")
            .id
    }
}

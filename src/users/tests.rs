use crate::config::test_helpers::{api_create, create_test_user, send, setup_test_app};
use crate::users::models::UserRole;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn admin_creates_and_lists_users() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;

    let created = api_create(
        &app,
        admin,
        "/api/users",
        json!({
            "username": "enum1",
            "email": "enum1@example.com",
            "first_name": "Alice",
            "last_name": "Smith",
            "role": "enumerator",
        }),
    )
    .await;
    assert_eq!(created["role"], "enumerator");
    assert_eq!(created["full_name"], "Alice Smith");

    let (status, body) = send(&app, "GET", "/api/users", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Role filter only returns enumerators
    let (status, body) = send(
        &app,
        "GET",
        "/api/users?role=enumerator",
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["username"], "enum1");
}

#[tokio::test]
async fn non_admins_cannot_create_users() {
    let (app, db) = setup_test_app().await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;

    let (status, _body) = send(
        &app,
        "POST",
        "/api/users",
        Some(enumerator),
        Some(json!({
            "username": "sneaky",
            "email": "sneaky@example.com",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn me_returns_the_calling_user() {
    let (app, db) = setup_test_app().await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;

    let (status, body) = send(&app, "GET", "/api/users/me", Some(enumerator), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "enum1");
    assert_eq!(body["role"], "enumerator");
}

#[tokio::test]
async fn role_is_immutable_through_update() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users/{enumerator}"),
        Some(admin),
        Some(json!({
            "username": "enum1",
            "email": "enum1@example.com",
            "first_name": "Alice",
            "last_name": "Smith",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    // Update payload carries no role; the stored role is untouched
    assert_eq!(body["role"], "enumerator");
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    create_test_user(&db, "enum1", UserRole::Enumerator).await;

    let (status, _body) = send(
        &app,
        "POST",
        "/api/users",
        Some(admin),
        Some(json!({
            "username": "enum1",
            "email": "other@example.com",
            "role": "enumerator",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn deleting_a_user_removes_their_routes_and_subtree() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;

    let route = api_create(
        &app,
        admin,
        "/api/routes",
        json!({"name": "Route 1", "assigned_to": enumerator}),
    )
    .await;
    let farm = api_create(
        &app,
        admin,
        "/api/farms",
        json!({
            "route_id": route["id"],
            "name": "Farm 1",
            "owner_name": "Farmer 1",
            "size_ha": 4.5,
        }),
    )
    .await;
    api_create(
        &app,
        admin,
        "/api/soil-samples",
        json!({
            "farm_id": farm["id"],
            "sample_date": "2025-06-01",
            "ph": 6.4,
        }),
    )
    .await;

    let (status, _body) = send(
        &app,
        "DELETE",
        &format!("/api/users/{enumerator}"),
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for endpoint in ["/api/routes", "/api/farms", "/api/soil-samples"] {
        let (status, body) = send(&app, "GET", endpoint, Some(admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(
            body.as_array().unwrap().is_empty(),
            "{endpoint} should be empty after cascade: {body:?}"
        );
    }
}

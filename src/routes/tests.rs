use crate::config::test_helpers::{api_create, create_test_user, send, setup_test_app};
use crate::users::models::UserRole;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn new_route_starts_pending_with_zero_progress() {
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

    assert_eq!(route["status"], "pending");
    assert_eq!(route["assigned_to_name"], "enum1");
    assert_eq!(route["farm_count"], 0);
    assert_eq!(route["completed_farms"], 0);
    assert_eq!(route["progress"], 0);
}

#[tokio::test]
async fn routes_must_be_assigned_to_an_enumerator() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;

    // Admins cannot hold routes themselves
    let (status, body) = send(
        &app,
        "POST",
        "/api/routes",
        Some(admin),
        Some(json!({"name": "Route 1", "assigned_to": admin})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "assigned_to");

    // Neither can users that do not exist
    let (status, body) = send(
        &app,
        "POST",
        "/api/routes",
        Some(admin),
        Some(json!({"name": "Route 1", "assigned_to": uuid::Uuid::new_v4()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "assigned_to");
}

#[tokio::test]
async fn enumerators_may_only_hold_their_own_routes() {
    let (app, db) = setup_test_app().await;
    let e1 = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let e2 = create_test_user(&db, "enum2", UserRole::Enumerator).await;

    let (status, _body) = send(
        &app,
        "POST",
        "/api/routes",
        Some(e1),
        Some(json!({"name": "For someone else", "assigned_to": e2})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let route = api_create(
        &app,
        e1,
        "/api/routes",
        json!({"name": "My route", "assigned_to": e1}),
    )
    .await;
    assert_eq!(route["assigned_to"], e1.to_string());
}

#[tokio::test]
async fn progress_counts_farms_with_any_observation() {
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
    let route_id = route["id"].as_str().unwrap().to_string();

    let farm1 = api_create(
        &app,
        admin,
        "/api/farms",
        json!({"route_id": route_id, "name": "Farm 1", "owner_name": "Farmer 1", "size_ha": 3.0}),
    )
    .await;
    api_create(
        &app,
        admin,
        "/api/farms",
        json!({"route_id": route_id, "name": "Farm 2", "owner_name": "Farmer 2", "size_ha": 2.0}),
    )
    .await;

    // One soil sample on the first farm: 1 of 2 farms completed
    api_create(
        &app,
        admin,
        "/api/soil-samples",
        json!({"farm_id": farm1["id"], "sample_date": "2025-06-01", "ph": 6.2}),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/routes/{route_id}"),
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["farm_count"], 2);
    assert_eq!(body["completed_farms"], 1);
    assert_eq!(body["progress"], 50);

    // A second observation on the same farm changes nothing
    api_create(
        &app,
        admin,
        "/api/water-samples",
        json!({"farm_id": farm1["id"], "sample_date": "2025-06-01", "source": "Well", "ph": 7.0}),
    )
    .await;
    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/routes/{route_id}"),
        Some(admin),
        None,
    )
    .await;
    assert_eq!(body["progress"], 50);
}

#[tokio::test]
async fn update_status_validates_the_value() {
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
    let route_id = route["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/routes/{route_id}/update_status"),
        Some(admin),
        Some(json!({"status": "finished"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "status");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("pending"));
    assert!(message.contains("in_progress"));
    assert!(message.contains("complete"));
}

#[tokio::test]
async fn update_status_requires_admin_or_assignee() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let assignee = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let other = create_test_user(&db, "enum2", UserRole::Enumerator).await;

    let route = api_create(
        &app,
        admin,
        "/api/routes",
        json!({"name": "Route 1", "assigned_to": assignee}),
    )
    .await;
    let uri = format!("/api/routes/{}/update_status", route["id"].as_str().unwrap());

    // Another enumerator is rejected, not silently filtered
    let (status, _body) = send(
        &app,
        "POST",
        &uri,
        Some(other),
        Some(json!({"status": "complete"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The assignee may move their own route
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(assignee),
        Some(json!({"status": "in_progress"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body:?}");
    assert_eq!(body["status"], "in_progress");
}

#[tokio::test]
async fn listing_is_scoped_and_filterable_by_status() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let e1 = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let e2 = create_test_user(&db, "enum2", UserRole::Enumerator).await;

    api_create(
        &app,
        admin,
        "/api/routes",
        json!({"name": "Route A", "assigned_to": e1, "status": "pending"}),
    )
    .await;
    api_create(
        &app,
        admin,
        "/api/routes",
        json!({"name": "Route B", "assigned_to": e2, "status": "complete"}),
    )
    .await;

    // Admin sees both, enumerators only their own
    let (_, body) = send(&app, "GET", "/api/routes", Some(admin), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(&app, "GET", "/api/routes", Some(e1), None).await;
    let visible = body.as_array().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["name"], "Route A");

    // Status filter composes with the scope
    let (_, body) = send(&app, "GET", "/api/routes?status=complete", Some(admin), None).await;
    let complete = body.as_array().unwrap();
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0]["name"], "Route B");

    let (_, body) = send(&app, "GET", "/api/routes?status=complete", Some(e1), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cross_scope_route_reads_are_forbidden_not_hidden() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let e1 = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let e2 = create_test_user(&db, "enum2", UserRole::Enumerator).await;

    let route = api_create(
        &app,
        admin,
        "/api/routes",
        json!({"name": "Route A", "assigned_to": e1}),
    )
    .await;

    let (status, _body) = send(
        &app,
        "GET",
        &format!("/api/routes/{}", route["id"].as_str().unwrap()),
        Some(e2),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A genuinely unknown id stays a 404
    let (status, _body) = send(
        &app,
        "GET",
        &format!("/api/routes/{}", uuid::Uuid::new_v4()),
        Some(e2),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

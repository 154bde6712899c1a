use crate::config::test_helpers::{api_create, create_test_user, send, setup_test_app};
use crate::users::models::UserRole;
use axum::http::StatusCode;
use axum::Router;
use serde_json::{Value, json};
use uuid::Uuid;

async fn route_for(app: &Router, admin: Uuid, enumerator: Uuid, name: &str) -> String {
    let route = api_create(
        app,
        admin,
        "/api/routes",
        json!({"name": name, "assigned_to": enumerator}),
    )
    .await;
    route["id"].as_str().unwrap().to_string()
}

async fn farm_on(app: &Router, user: Uuid, route_id: &str, name: &str) -> Value {
    api_create(
        app,
        user,
        "/api/farms",
        json!({
            "route_id": route_id,
            "name": name,
            "owner_name": format!("Owner of {name}"),
            "size_ha": 4.25,
        }),
    )
    .await
}

#[tokio::test]
async fn farm_visibility_follows_route_assignment() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let e1 = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let e2 = create_test_user(&db, "enum2", UserRole::Enumerator).await;

    let r1 = route_for(&app, admin, e1, "Route A").await;
    let r2 = route_for(&app, admin, e2, "Route B").await;
    farm_on(&app, admin, &r1, "Farm A1").await;
    farm_on(&app, admin, &r1, "Farm A2").await;
    farm_on(&app, admin, &r2, "Farm B1").await;

    let (_, body) = send(&app, "GET", "/api/farms", Some(admin), None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = send(&app, "GET", "/api/farms", Some(e1), None).await;
    let visible = body.as_array().unwrap();
    assert_eq!(visible.len(), 2);
    for farm in visible {
        assert_eq!(farm["route_name"], "Route A");
    }

    let (_, body) = send(&app, "GET", "/api/farms", Some(e2), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn creating_a_farm_on_someone_elses_route_is_forbidden() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let e1 = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let e2 = create_test_user(&db, "enum2", UserRole::Enumerator).await;

    let r1 = route_for(&app, admin, e1, "Route A").await;

    let (status, _body) = send(
        &app,
        "POST",
        "/api/farms",
        Some(e2),
        Some(json!({
            "route_id": r1,
            "name": "Intruding farm",
            "owner_name": "Nobody",
            "size_ha": 1.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The assigned enumerator can create farms on their own route
    let farm = farm_on(&app, e1, &r1, "Farm A1").await;
    assert_eq!(farm["route_id"], r1);
}

#[tokio::test]
async fn farm_size_must_be_positive() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let route = route_for(&app, admin, enumerator, "Route A").await;

    for size in [0.0, -2.5] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/farms",
            Some(admin),
            Some(json!({
                "route_id": route,
                "name": "Tiny farm",
                "owner_name": "Farmer",
                "size_ha": size,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "size_ha");
    }
}

#[tokio::test]
async fn farm_detail_includes_crops_counts_and_route_name() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let route = route_for(&app, admin, enumerator, "Route A").await;
    let farm = farm_on(&app, admin, &route, "Farm A1").await;
    let farm_id = farm["id"].as_str().unwrap();

    api_create(
        &app,
        admin,
        "/api/crops",
        json!({
            "farm_id": farm_id,
            "crop_type": "Maize",
            "planting_date": "2025-03-10",
        }),
    )
    .await;
    api_create(
        &app,
        admin,
        "/api/soil-samples",
        json!({"farm_id": farm_id, "sample_date": "2025-06-01", "ph": 6.1}),
    )
    .await;

    let (status, body) = send(&app, "GET", &format!("/api/farms/{farm_id}"), Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route_name"], "Route A");
    assert_eq!(body["soil_sample_count"], 1);
    assert_eq!(body["water_sample_count"], 0);
    assert_eq!(body["crops"].as_array().unwrap().len(), 1);
    assert_eq!(body["crops"][0]["crop_type"], "Maize");
}

#[tokio::test]
async fn deleting_a_farm_removes_its_children() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let route = route_for(&app, admin, enumerator, "Route A").await;
    let farm = farm_on(&app, admin, &route, "Farm A1").await;
    let farm_id = farm["id"].as_str().unwrap();

    api_create(
        &app,
        admin,
        "/api/crops",
        json!({"farm_id": farm_id, "crop_type": "Beans", "planting_date": "2025-04-01"}),
    )
    .await;
    api_create(
        &app,
        admin,
        "/api/pest-disease",
        json!({
            "farm_id": farm_id,
            "report_date": "2025-06-01",
            "category": "pest",
            "name": "Aphids",
            "severity": "low",
        }),
    )
    .await;

    let (status, _body) = send(
        &app,
        "DELETE",
        &format!("/api/farms/{farm_id}"),
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for endpoint in ["/api/crops", "/api/pest-disease"] {
        let (_, body) = send(&app, "GET", endpoint, Some(admin), None).await;
        assert!(body.as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn farm_samples_endpoint_groups_both_kinds() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let route = route_for(&app, admin, enumerator, "Route A").await;
    let farm = farm_on(&app, admin, &route, "Farm A1").await;
    let farm_id = farm["id"].as_str().unwrap();

    api_create(
        &app,
        admin,
        "/api/soil-samples",
        json!({"farm_id": farm_id, "sample_date": "2025-06-01", "ph": 6.5}),
    )
    .await;
    api_create(
        &app,
        admin,
        "/api/water-samples",
        json!({"farm_id": farm_id, "sample_date": "2025-06-02", "source": "River", "ph": 7.2}),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/farms/{farm_id}/samples"),
        Some(admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["soil_samples"].as_array().unwrap().len(), 1);
    assert_eq!(body["water_samples"].as_array().unwrap().len(), 1);
    assert_eq!(body["soil_samples"][0]["farm_name"], "Farm A1");

    // The endpoint itself is scoped
    let other = create_test_user(&db, "enum2", UserRole::Enumerator).await;
    let (status, _body) = send(
        &app,
        "GET",
        &format!("/api/farms/{farm_id}/samples"),
        Some(other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

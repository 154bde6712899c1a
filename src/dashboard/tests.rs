use crate::config::test_helpers::{api_create, create_test_user, send, setup_test_app};
use crate::users::models::UserRole;
use axum::Router;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

async fn create_route(app: &Router, admin: Uuid, enumerator: Uuid, name: &str, status: &str) -> String {
    let route = api_create(
        app,
        admin,
        "/api/routes",
        json!({"name": name, "assigned_to": enumerator, "status": status}),
    )
    .await;
    route["id"].as_str().unwrap().to_string()
}

async fn create_farm(app: &Router, admin: Uuid, route_id: &str, name: &str) -> String {
    let farm = api_create(
        app,
        admin,
        "/api/farms",
        json!({
            "route_id": route_id,
            "name": name,
            "owner_name": "Farmer",
            "size_ha": 2.0,
        }),
    )
    .await;
    farm["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn empty_scope_reads_all_zeros() {
    let (app, db) = setup_test_app().await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;

    let (status, body) = send(&app, "GET", "/api/dashboard", Some(enumerator), None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["user"]["role"], "enumerator");
    assert_eq!(body["routes"]["total"], 0);
    assert_eq!(body["farms"]["total"], 0);
    assert!(body["farms"]["by_route"].as_array().unwrap().is_empty());
    assert_eq!(body["sampling"]["soil"]["total"], 0);
    assert!(body["sampling"]["soil"]["latest"].as_array().unwrap().is_empty());
    assert_eq!(body["sampling"]["water"]["total"], 0);
    assert_eq!(body["pest_disease"]["total"], 0);
    assert_eq!(body["pest_disease"]["by_category"]["pest"], 0);
    assert_eq!(body["pest_disease"]["by_severity"]["high"], 0);
    assert!(body["activity"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn counts_and_breakdowns_cover_the_admin_scope() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let e1 = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let e2 = create_test_user(&db, "enum2", UserRole::Enumerator).await;

    // Deliberately created out of name order to pin the by_route ordering
    let rb = create_route(&app, admin, e1, "B Route", "in_progress").await;
    let ra = create_route(&app, admin, e2, "A Route", "pending").await;

    let fa = create_farm(&app, admin, &ra, "Farm A1").await;
    create_farm(&app, admin, &rb, "Farm B1").await;
    create_farm(&app, admin, &rb, "Farm B2").await;

    api_create(
        &app,
        admin,
        "/api/soil-samples",
        json!({"farm_id": fa, "sample_date": "2025-06-01", "ph": 6.3}),
    )
    .await;
    api_create(
        &app,
        admin,
        "/api/water-samples",
        json!({"farm_id": fa, "sample_date": "2025-06-02", "source": "Well", "ph": 7.1}),
    )
    .await;
    for (category, severity, name) in [
        ("pest", "high", "Fall armyworm"),
        ("pest", "low", "Aphids"),
        ("disease", "medium", "Leaf rust"),
    ] {
        api_create(
            &app,
            admin,
            "/api/pest-disease",
            json!({
                "farm_id": fa,
                "report_date": "2025-06-03",
                "category": category,
                "name": name,
                "severity": severity,
            }),
        )
        .await;
    }

    let (status, body) = send(&app, "GET", "/api/dashboard", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["routes"]["total"], 2);
    assert_eq!(body["routes"]["pending"], 1);
    assert_eq!(body["routes"]["in_progress"], 1);
    assert_eq!(body["routes"]["complete"], 0);

    assert_eq!(body["farms"]["total"], 3);
    let by_route = body["farms"]["by_route"].as_array().unwrap();
    assert_eq!(by_route.len(), 2);
    // Deterministic ordering by route name
    assert_eq!(by_route[0]["name"], "A Route");
    assert_eq!(by_route[0]["count"], 1);
    assert_eq!(by_route[1]["name"], "B Route");
    assert_eq!(by_route[1]["count"], 2);

    assert_eq!(body["sampling"]["soil"]["total"], 1);
    let latest_soil = body["sampling"]["soil"]["latest"].as_array().unwrap();
    assert_eq!(latest_soil.len(), 1);
    assert_eq!(latest_soil[0]["farm_name"], "Farm A1");
    assert_eq!(latest_soil[0]["ph"], 6.3);
    assert_eq!(body["sampling"]["water"]["total"], 1);

    assert_eq!(body["pest_disease"]["total"], 3);
    assert_eq!(body["pest_disease"]["by_category"]["pest"], 2);
    assert_eq!(body["pest_disease"]["by_category"]["disease"], 1);
    assert_eq!(body["pest_disease"]["by_severity"]["low"], 1);
    assert_eq!(body["pest_disease"]["by_severity"]["medium"], 1);
    assert_eq!(body["pest_disease"]["by_severity"]["high"], 1);
    let latest_reports = body["pest_disease"]["latest"].as_array().unwrap();
    assert_eq!(latest_reports.len(), 3);
}

#[tokio::test]
async fn enumerators_see_only_their_own_numbers() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let e1 = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let e2 = create_test_user(&db, "enum2", UserRole::Enumerator).await;

    let r1 = create_route(&app, admin, e1, "Route 1", "pending").await;
    let r2 = create_route(&app, admin, e2, "Route 2", "pending").await;
    let f1 = create_farm(&app, admin, &r1, "Farm 1").await;
    let f2 = create_farm(&app, admin, &r2, "Farm 2").await;

    api_create(
        &app,
        admin,
        "/api/soil-samples",
        json!({"farm_id": f1, "sample_date": "2025-06-01", "ph": 6.0}),
    )
    .await;
    api_create(
        &app,
        admin,
        "/api/soil-samples",
        json!({"farm_id": f2, "sample_date": "2025-06-01", "ph": 7.0}),
    )
    .await;

    let (_, body) = send(&app, "GET", "/api/dashboard", Some(e1), None).await;
    assert_eq!(body["routes"]["total"], 1);
    assert_eq!(body["farms"]["total"], 1);
    assert_eq!(body["sampling"]["soil"]["total"], 1);
    let latest = body["sampling"]["soil"]["latest"].as_array().unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0]["farm_name"], "Farm 1");

    // The other enumerator's activity never leaks into the feed
    for item in body["activity"].as_array().unwrap() {
        if let Some(farm_name) = item["farm_name"].as_str() {
            assert_eq!(farm_name, "Farm 1");
        }
    }
}

#[tokio::test]
async fn activity_feed_is_bounded_and_sorted() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;

    let route = create_route(&app, admin, enumerator, "Route 1", "in_progress").await;
    // 6 farms plus 5 soil samples and 5 water samples: far more than fits
    let mut farm_ids = Vec::new();
    for index in 0..6 {
        farm_ids.push(create_farm(&app, admin, &route, &format!("Farm {index}")).await);
    }
    for farm_id in farm_ids.iter().take(5) {
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
            json!({"farm_id": farm_id, "sample_date": "2025-06-01", "source": "Well", "ph": 7.0}),
        )
        .await;
    }

    let (status, body) = send(&app, "GET", "/api/dashboard", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let activity = body["activity"].as_array().unwrap();
    assert_eq!(activity.len(), 10);

    let dates: Vec<DateTime<Utc>> = activity
        .iter()
        .map(|item: &Value| {
            item["date"]
                .as_str()
                .unwrap()
                .parse::<DateTime<Utc>>()
                .unwrap()
        })
        .collect();
    for pair in dates.windows(2) {
        assert!(pair[0] >= pair[1], "activity must be newest-first: {dates:?}");
    }

    // Every item carries a kind tag and a human-readable summary
    for item in activity {
        assert!(item["type"].is_string());
        assert!(!item["summary"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn dashboard_never_mutates_the_store() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let route = create_route(&app, admin, enumerator, "Route 1", "pending").await;
    create_farm(&app, admin, &route, "Farm 1").await;

    let (_, first) = send(&app, "GET", "/api/dashboard", Some(admin), None).await;
    let (_, second) = send(&app, "GET", "/api/dashboard", Some(admin), None).await;
    assert_eq!(first, second);
}

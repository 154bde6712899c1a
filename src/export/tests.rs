use crate::config::test_helpers::{api_create, create_test_user, send, setup_test_app};
use crate::users::models::UserRole;
use axum::Router;
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

/// Pull the CSV text out of the test helper's fallback payload.
fn csv_lines(body: &Value) -> Vec<String> {
    body["raw"]
        .as_str()
        .expect("export response should be CSV text")
        .lines()
        .map(str::to_string)
        .collect()
}

async fn setup_farm(app: &Router, admin: Uuid, enumerator: Uuid, name: &str) -> String {
    let route = api_create(
        app,
        admin,
        "/api/routes",
        json!({"name": "Route A", "assigned_to": enumerator}),
    )
    .await;
    let farm = api_create(
        app,
        admin,
        "/api/farms",
        json!({
            "route_id": route["id"],
            "name": name,
            "owner_name": "Farmer",
            "size_ha": 4.5,
        }),
    )
    .await;
    farm["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn exports_are_admin_only() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    setup_farm(&app, admin, enumerator, "Farm A1").await;

    // Even for data inside their own scope, enumerators get a rejection
    // rather than a reduced row set
    for kind in ["farms", "soil-samples", "water-samples", "pest-disease"] {
        let (status, _body) = send(
            &app,
            "GET",
            &format!("/api/export/{kind}"),
            Some(enumerator),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "export of {kind}");
    }
}

#[tokio::test]
async fn unknown_kinds_are_validation_errors() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;

    let (status, body) = send(&app, "GET", "/api/export/routes", Some(admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "kind");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("farms"));
    assert!(message.contains("pest-disease"));
}

#[tokio::test]
async fn farm_export_has_fixed_columns_and_recency_order() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;

    let route = api_create(
        &app,
        admin,
        "/api/routes",
        json!({"name": "Northern Route", "assigned_to": enumerator}),
    )
    .await;
    for name in ["Older Farm", "Newer Farm"] {
        api_create(
            &app,
            admin,
            "/api/farms",
            json!({
                "route_id": route["id"],
                "name": name,
                "owner_name": "Farmer",
                "size_ha": 3.25,
            }),
        )
        .await;
    }

    let (status, body) = send(&app, "GET", "/api/export/farms", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let lines = csv_lines(&body);
    assert_eq!(
        lines[0],
        "id,name,ownerName,location,address,sizeHa,routeName,latitude,longitude,createdAt"
    );
    assert_eq!(lines.len(), 3);
    // Newest first
    assert!(lines[1].contains("Newer Farm"), "{lines:?}");
    assert!(lines[2].contains("Older Farm"), "{lines:?}");
    assert!(lines[1].contains("Northern Route"));
    assert!(lines[1].contains("3.25"));
}

#[tokio::test]
async fn sample_exports_format_dates_and_timestamps() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let farm_id = setup_farm(&app, admin, enumerator, "Farm A1").await;

    api_create(
        &app,
        admin,
        "/api/soil-samples",
        json!({
            "farm_id": farm_id,
            "sample_date": "2025-06-01",
            "ph": 6.4,
            "moisture_pct": 32.5,
            "nutrient_n": 120,
            "notes": "after rain",
        }),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/export/soil-samples", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let lines = csv_lines(&body);
    assert_eq!(
        lines[0],
        "id,farmName,sampleDate,pH,moisturePct,nitrogen,phosphorus,potassium,notes,createdAt"
    );
    assert_eq!(lines.len(), 2);

    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields[1], "Farm A1");
    assert_eq!(fields[2], "2025-06-01");
    assert_eq!(fields[3], "6.4");
    assert_eq!(fields[4], "32.5");
    // Optional nutrients left unset stay empty rather than reading as zero
    assert_eq!(fields[6], "");
    assert_eq!(fields[7], "");
    // createdAt is a full timestamp: YYYY-MM-DD HH:MM:SS
    let created_at = fields[9];
    assert_eq!(created_at.len(), 19);
    assert_eq!(created_at.as_bytes()[10], b' ');
    assert!(created_at[..4].parse::<i32>().is_ok());
}

#[tokio::test]
async fn water_and_pest_exports_carry_their_own_columns() {
    let (app, db) = setup_test_app().await;
    let admin = create_test_user(&db, "admin", UserRole::Admin).await;
    let enumerator = create_test_user(&db, "enum1", UserRole::Enumerator).await;
    let farm_id = setup_farm(&app, admin, enumerator, "Farm A1").await;

    api_create(
        &app,
        admin,
        "/api/water-samples",
        json!({
            "farm_id": farm_id,
            "sample_date": "2025-06-02",
            "source": "Borehole",
            "ph": 7.2,
            "turbidity": 4.5,
        }),
    )
    .await;
    api_create(
        &app,
        admin,
        "/api/pest-disease",
        json!({
            "farm_id": farm_id,
            "report_date": "2025-06-03",
            "category": "disease",
            "name": "Leaf rust",
            "severity": "medium",
        }),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/export/water-samples", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let lines = csv_lines(&body);
    assert_eq!(
        lines[0],
        "id,farmName,source,sampleDate,pH,turbidity,notes,createdAt"
    );
    assert!(lines[1].contains("Borehole"));
    assert!(lines[1].contains("2025-06-02"));

    let (status, body) = send(&app, "GET", "/api/export/pest-disease", Some(admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let lines = csv_lines(&body);
    assert_eq!(
        lines[0],
        "id,farmName,category,name,severity,reportDate,description,createdAt"
    );
    let fields: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(fields[2], "disease");
    assert_eq!(fields[3], "Leaf rust");
    assert_eq!(fields[4], "medium");
    assert_eq!(fields[5], "2025-06-03");
}

//! AgriSurvey database seeder
//!
//! A terminal application for populating a development instance with
//! realistic demo data: an admin, a handful of enumerators, their routes,
//! farms, crops, samples and pest/disease reports.
//!
//! The bootstrap admin is inserted directly through the database (there is
//! no unauthenticated user-creation endpoint); everything else goes through
//! the HTTP API authenticated as that admin, which only works against a
//! deployment running without Keycloak (local/dev header authentication).
//!
//! Usage:
//!   `DB_URL=postgresql://... cargo run --bin seed_database -- --url http://localhost:3000`

use chrono::{Duration as ChronoDuration, Utc};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use migration::{Migrator, MigratorTrait};
use rand::Rng;
use reqwest::Client;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(about = "Seed an AgriSurvey deployment with demo data")]
struct Args {
    /// Base URL of a running agrisurvey-api instance
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Database URL for bootstrapping the admin user (falls back to $DB_URL)
    #[arg(long)]
    db_url: Option<String>,
}

struct Seeder {
    base_url: String,
    admin_id: Uuid,
    client: Client,
}

impl Seeder {
    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, String> {
        let response = self
            .client
            .post(format!("{}{endpoint}", self.base_url))
            .header("x-user-id", self.admin_id.to_string())
            .json(body)
            .send()
            .await
            .map_err(|err| format!("request to {endpoint} failed: {err}"))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|err| format!("invalid JSON from {endpoint}: {err}"))?;

        if !status.is_success() {
            return Err(format!("{endpoint} returned {status}: {payload}"));
        }
        Ok(payload)
    }
}

/// Insert the bootstrap admin directly; user creation is an admin-only API
/// operation, so the first admin cannot come through the API itself.
async fn bootstrap_admin(db_url: &str) -> Result<Uuid, String> {
    let db = Database::connect(db_url)
        .await
        .map_err(|err| format!("could not connect to {db_url}: {err}"))?;

    Migrator::up(&db, None)
        .await
        .map_err(|err| format!("migrations failed: {err}"))?;

    let backend = db.get_database_backend();

    let existing = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT id FROM users WHERE username = $1",
            ["admin".into()],
        ))
        .await
        .map_err(|err| err.to_string())?;

    if let Some(row) = existing {
        let id: Uuid = row.try_get("", "id").map_err(|err| err.to_string())?;
        println!("{}", style("Admin user already exists").yellow());
        return Ok(id);
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (id, username, email, first_name, last_name, role, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        [
            id.into(),
            "admin".into(),
            "admin@example.com".into(),
            "Admin".into(),
            "User".into(),
            "admin".into(),
            now.into(),
            now.into(),
        ],
    ))
    .await
    .map_err(|err| err.to_string())?;

    println!("{}", style("Admin user created").green());
    Ok(id)
}

fn progress_bar(len: u64, label: &str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("{msg:24} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap()
            .progress_chars("##-"),
    );
    bar.set_message(label.to_string());
    bar
}

async fn seed(seeder: &Seeder) -> Result<(), String> {
    let mut rng = rand::rng();

    // Enumerators
    let enumerators = [
        ("enum1", "Alice", "Smith"),
        ("enum2", "Bob", "Johnson"),
        ("enum3", "Carol", "Williams"),
    ];
    let bar = progress_bar(enumerators.len() as u64, "Enumerators");
    let mut enumerator_ids = Vec::new();
    for (username, first, last) in enumerators {
        let user = seeder
            .post(
                "/api/users",
                &json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "first_name": first,
                    "last_name": last,
                    "role": "enumerator",
                }),
            )
            .await?;
        enumerator_ids.push(user["id"].as_str().unwrap_or_default().to_string());
        bar.inc(1);
    }
    bar.finish();

    // One route per enumerator, two farms each, with observations
    let statuses = ["pending", "in_progress", "complete"];
    let bar = progress_bar(enumerator_ids.len() as u64, "Routes and farms");
    for (index, enumerator_id) in enumerator_ids.iter().enumerate() {
        let route = seeder
            .post(
                "/api/routes",
                &json!({
                    "name": format!("Route {}", index + 1),
                    "assigned_to": enumerator_id,
                    "status": statuses[index % statuses.len()],
                }),
            )
            .await?;
        let route_id = route["id"].as_str().unwrap_or_default().to_string();

        for farm_index in 0..2 {
            let farm_number = index * 2 + farm_index + 1;
            let latitude = -1.0 + rng.random::<f64>() * 2.0;
            let longitude = 36.0 + rng.random::<f64>() * 2.0;
            let farm = seeder
                .post(
                    "/api/farms",
                    &json!({
                        "route_id": route_id,
                        "name": format!("Farm {farm_number}"),
                        "owner_name": format!("Farmer {farm_number}"),
                        "size_ha": 5.0 + farm_index as f64 * 2.5,
                        "location": format!("Zone {}", index + 1),
                        "address": format!("{farm_number} Rural Road"),
                        "latitude": latitude,
                        "longitude": longitude,
                    }),
                )
                .await?;
            let farm_id = farm["id"].as_str().unwrap_or_default().to_string();

            let planting = (Utc::now() - ChronoDuration::days(90)).date_naive();
            let harvest = (Utc::now() + ChronoDuration::days(60)).date_naive();
            seeder
                .post(
                    "/api/crops",
                    &json!({
                        "farm_id": farm_id,
                        "crop_type": (["Maize", "Beans", "Coffee"][farm_number % 3]),
                        "variety": "Local",
                        "planting_date": planting.to_string(),
                        "expected_harvest": harvest.to_string(),
                    }),
                )
                .await?;

            // First farm of each route gets observations so route progress
            // lands at 50%
            if farm_index == 0 {
                let sample_date = (Utc::now() - ChronoDuration::days(3)).date_naive();
                seeder
                    .post(
                        "/api/soil-samples",
                        &json!({
                            "farm_id": farm_id,
                            "sample_date": sample_date.to_string(),
                            "ph": 5.5 + rng.random::<f64>() * 2.0,
                            "moisture_pct": 20.0 + rng.random::<f64>() * 40.0,
                            "nutrient_n": 120.0,
                            "nutrient_p": 45.0,
                            "nutrient_k": 80.0,
                        }),
                    )
                    .await?;
                seeder
                    .post(
                        "/api/water-samples",
                        &json!({
                            "farm_id": farm_id,
                            "sample_date": sample_date.to_string(),
                            "source": "Borehole",
                            "ph": 6.5 + rng.random::<f64>(),
                            "turbidity": 5.0 + rng.random::<f64>() * 10.0,
                        }),
                    )
                    .await?;
                seeder
                    .post(
                        "/api/pest-disease",
                        &json!({
                            "farm_id": farm_id,
                            "report_date": sample_date.to_string(),
                            "category": if farm_number % 2 == 0 { "pest" } else { "disease" },
                            "name": if farm_number % 2 == 0 { "Fall armyworm" } else { "Leaf rust" },
                            "severity": (["low", "medium", "high"][farm_number % 3]),
                            "description": "Spotted during routine survey",
                        }),
                    )
                    .await?;
            }
        }
        bar.inc(1);
    }
    bar.finish();

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    println!("{}", style("AgriSurvey database seeder").bold());

    let db_url = args
        .db_url
        .or_else(|| std::env::var("DB_URL").ok())
        .expect("set --db-url or the DB_URL environment variable");

    let admin_id = match bootstrap_admin(&db_url).await {
        Ok(id) => id,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red());
            std::process::exit(1);
        }
    };

    let seeder = Seeder {
        base_url: args.url.trim_end_matches('/').to_string(),
        admin_id,
        client: Client::new(),
    };

    if let Err(err) = seed(&seeder).await {
        eprintln!("{} {err}", style("error:").red());
        std::process::exit(1);
    }

    println!(
        "{}",
        style("Seeding complete. Log in with the admin user id above").green()
    );
}

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use tracing::info;
use ulid::Ulid;

use nightstock::compactor;
use nightstock::config::Config;
use nightstock::engine::Engine;
use nightstock::model::{Price, SeedRow};
use nightstock::notify::NotifyHub;

/// Demo catalog: (name, base price, rooms per night). Weekend nights
/// (Fri/Sat) carry a flat surcharge.
const CATALOG: &[(&str, Price, u32)] = &[
    ("Standard Queen", 580, 10),
    ("Standard Twin", 620, 10),
    ("Superior Queen", 720, 8),
    ("Deluxe Sea View", 880, 6),
    ("Family Room", 980, 5),
    ("Executive Suite", 1280, 4),
    ("Presidential Suite", 2880, 2),
    ("Accessible Room", 650, 2),
];

const WEEKEND_SURCHARGE: Price = 80;

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Fri | Weekday::Sat)
}

async fn seed(engine: &Engine, days: u32) -> Result<usize, Box<dyn std::error::Error>> {
    let today = Utc::now().date_naive();
    let mut seeded_rows = 0usize;

    for &(name, base_price, stock) in CATALOG {
        let id = Ulid::new();
        engine.create_room_type(id, name.to_string()).await?;

        let rows: Vec<SeedRow> = std::iter::successors(Some(today), |d| d.succ_opt())
            .take(days as usize)
            .map(|date| SeedRow {
                date,
                price: if is_weekend(date) { base_price + WEEKEND_SURCHARGE } else { base_price },
                remaining: stock,
            })
            .collect();
        engine.seed_inventory(id, &rows).await?;
        seeded_rows += rows.len();
    }

    Ok(seeded_rows)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    nightstock::observability::init(config.metrics_port);
    std::fs::create_dir_all(config.data_dir())?;

    let notify = Arc::new(NotifyHub::new());
    let engine = Arc::new(Engine::new(&config, notify)?);

    if engine.room_types().is_empty() {
        let rows = seed(&engine, config.seed_days).await?;
        info!("seeded {} room types x {} days = {rows} inventory rows", CATALOG.len(), config.seed_days);
    } else {
        info!("already seeded, skipping");
    }

    info!(
        "nightstock ready: {}",
        serde_json::json!({
            "journal": config.journal_path(),
            "room_types": engine.room_types().len(),
            "bookings": engine.booking_count().await,
        })
    );

    tokio::spawn(compactor::run_compactor(engine.clone(), config.compact_threshold));

    tokio::signal::ctrl_c().await?;
    info!("nightstock stopped");
    Ok(())
}

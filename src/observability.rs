use std::net::SocketAddr;

use crate::engine::EngineError;
use crate::model::Booking;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: reservation attempts. Labels: status.
pub const RESERVATIONS_TOTAL: &str = "nightstock_reservations_total";

/// Histogram: reservation latency in seconds, all outcomes.
pub const RESERVATION_DURATION_SECONDS: &str = "nightstock_reservation_duration_seconds";

/// Counter: nights credited back by failed multi-night requests.
pub const ROLLBACK_NIGHTS_TOTAL: &str = "nightstock_rollback_nights_total";

// ── Journal metrics ─────────────────────────────────────────────

/// Histogram: group-commit flush duration in seconds.
pub const JOURNAL_FLUSH_DURATION_SECONDS: &str = "nightstock_journal_flush_duration_seconds";

/// Histogram: group-commit batch size (events per fsync).
pub const JOURNAL_FLUSH_BATCH_SIZE: &str = "nightstock_journal_flush_batch_size";

/// Install the Prometheus exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Map a reservation outcome to its status label.
pub fn reservation_status(result: &Result<Booking, EngineError>) -> &'static str {
    match result {
        Ok(_) => "confirmed",
        Err(EngineError::InvalidInput(_)) => "invalid_input",
        Err(EngineError::NoInventory) => "no_inventory",
        Err(EngineError::SoldOut { .. }) => "sold_out",
        Err(EngineError::SoldOutRace { .. }) => "sold_out_race",
        Err(EngineError::UnknownRoomType(_)) => "unknown_room_type",
        Err(EngineError::AlreadyExists(_)) => "already_exists",
        Err(EngineError::LimitExceeded(_)) => "limit_exceeded",
        Err(EngineError::Storage(_)) => "storage_unavailable",
    }
}

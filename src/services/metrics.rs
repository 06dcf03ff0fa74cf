use std::sync::Arc;

use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_gauge, CounterVec, Gauge};
use tracing::{info, warn};

use crate::db::AnnouncementStore;

lazy_static! {
    pub static ref ANNOUNCEMENT_OPS_COUNTER: CounterVec = register_counter_vec!(
        "announcement_operations_total",
        "Announcement operations by operation and outcome",
        &["operation", "outcome"]
    ).unwrap();

    pub static ref ACTIVE_ANNOUNCEMENTS_GAUGE: Gauge = register_gauge!(
        "announcements_active",
        "Announcements whose active window contains now"
    ).unwrap();
}

/// Count one call of `operation`, labelled `ok` or by error kind.
pub fn record<T>(operation: &str, result: &Result<T, crate::error::AppError>) {
    use crate::error::AppError;

    let outcome = match result {
        Ok(_) => "ok",
        Err(AppError::InvalidInput(_)) => "invalid_input",
        Err(AppError::Unauthenticated(_)) => "unauthenticated",
        Err(AppError::NotFound(_)) => "not_found",
        Err(AppError::Internal { .. }) => "internal",
    };
    ANNOUNCEMENT_OPS_COUNTER
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Spawn the background gauge collector (refreshes every 5 minutes).
pub fn start(store: Arc<dyn AnnouncementStore>) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = collect(store.as_ref()).await {
                warn!("Metrics: collection failed: {}", e);
            }
            tokio::time::sleep(tokio::time::Duration::from_secs(300)).await;
        }
    });
}

async fn collect(store: &dyn AnnouncementStore) -> anyhow::Result<()> {
    let active = store.list(Some(Utc::now())).await?.len();
    ACTIVE_ANNOUNCEMENTS_GAUGE.set(active as f64);
    info!("Metrics: {} active announcement(s)", active);
    Ok(())
}

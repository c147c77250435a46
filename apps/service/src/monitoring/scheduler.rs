use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, warn};

use super::checker::Checker;
use super::types::Probe;
use crate::database::{StatusRecord, StatusStore};

/// Periodically checks one target and appends every observation to the store.
pub struct MonitoringScheduler {
    checker: Arc<dyn Checker>,
    store: Arc<dyn StatusStore>,
    target: String,
    interval: Duration,
}

impl MonitoringScheduler {
    pub fn new(
        checker: Arc<dyn Checker>,
        store: Arc<dyn StatusStore>,
        target: String,
        interval: Duration,
    ) -> Self {
        Self { checker, store, target, interval }
    }

    /// Run the loop on its own task until `shutdown` turns `true` or its
    /// sender is dropped.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        // The first check happens one full interval after start.
        let mut timer = interval_at(Instant::now() + self.interval, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Starting site monitoring for {} (checking every {:?})", self.target, self.interval);

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.tick(Utc::now()).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Site monitoring for {} stopped", self.target);
    }

    /// One check: probe, record, persist. Never fails; errors are logged.
    pub async fn tick(&self, at: DateTime<Utc>) -> StatusRecord {
        debug!("Checking {}", self.target);

        let probe = self.checker.check(&self.target).await.unwrap_or_else(|e| {
            warn!("Error checking site: {}", e);
            Probe::offline()
        });

        info!(
            online = probe.online,
            latency_ms = probe.latency_ms,
            status_code = probe.status_code,
            "Checked at {}",
            at.to_rfc3339()
        );

        let record = StatusRecord::new(at, probe.online, probe.latency_ms);
        if let Err(e) = self.store.append(&record).await {
            error!("{}", e);
        }

        debug!("Idle until next tick");
        record
    }
}

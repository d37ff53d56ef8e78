//! Scheduler — periodic clock ticks and heartbeats for the trigger engine.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use trygr_domain::id::PostalCode;
use trygr_domain::time::{Timestamp, now};

use crate::ports::{DeviceCapability, DeviceStore, LocationStore, Notifier};
use crate::trigger_engine::{PassReport, TriggerEngine};

/// Drives time-based triggers at a fixed interval.
///
/// Each tick refreshes the configured location from the store, evaluates
/// scheduled triggers, then re-offers device and weather state to level
/// triggers. Firing precision is bounded by the interval: a trigger fires
/// up to one interval late, never early.
pub struct Scheduler<DS, N, C, LS> {
    engine: Arc<TriggerEngine<DS, N, C>>,
    locations: LS,
    postal_code: Option<PostalCode>,
    interval: Duration,
}

impl<DS, N, C, LS> Scheduler<DS, N, C, LS>
where
    DS: DeviceStore + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
    C: DeviceCapability + 'static,
    LS: LocationStore + Sync,
{
    pub fn new(
        engine: Arc<TriggerEngine<DS, N, C>>,
        locations: LS,
        postal_code: Option<PostalCode>,
        interval: Duration,
    ) -> Self {
        Self {
            engine,
            locations,
            postal_code,
            interval,
        }
    }

    /// Tick until `shutdown` changes or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval_secs = self.interval.as_secs(), "scheduler started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    let report = self.tick(now()).await;
                    if !report.is_empty() {
                        tracing::debug!(fired = report.len(), "scheduler tick fired triggers");
                    }
                }
            }
        }
        tracing::info!("scheduler stopped");
    }

    /// One tick at `at`: refresh location, scheduled pass, heartbeat pass.
    pub async fn tick(&self, at: Timestamp) -> PassReport {
        self.refresh_location().await;
        let mut report = self.engine.run_tick(at).await;
        report.merge(self.engine.heartbeat().await);
        report
    }

    async fn refresh_location(&self) {
        let Some(postal_code) = &self.postal_code else {
            return;
        };
        match self.locations.get_by_postal_code(postal_code).await {
            Ok(Some(location)) => self.engine.remember_location(location),
            Ok(None) => tracing::debug!(%postal_code, "configured location not cached yet"),
            Err(err) => tracing::warn!(%err, %postal_code, "failed to refresh location"),
        }
    }
}

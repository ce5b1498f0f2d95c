use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::{monitor::ChangeMonitor, types::CycleOutcome};

/// Drives a [`ChangeMonitor`] from a fixed-period ticker.
///
/// Ticks and the in-flight cycle are polled from the same `select!` loop, so
/// a tick that lands while a check is pending reaches the monitor and is
/// dropped by its run guard. Nothing else touches the monitor concurrently.
pub struct MonitorEngine {
    monitor: ChangeMonitor,
    period: Duration,
}

impl MonitorEngine {
    pub fn new(monitor: ChangeMonitor, period: Duration) -> Self {
        Self { monitor, period }
    }

    /// Main event loop. Ticks every `period` until `shutdown` broadcasts `true`
    /// (or its sender goes away), then hands the monitor back.
    ///
    /// The first tick fires one full period after start. A cycle still in
    /// flight at shutdown is dropped, not awaited.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> ChangeMonitor {
        info!(
            url = %self.monitor.url(),
            period_secs = self.period.as_secs(),
            "monitor engine started"
        );

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: Option<BoxFuture<'static, CycleOutcome>> = None;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(cycle) = self.monitor.try_begin() {
                        in_flight = Some(cycle.run().boxed());
                    }
                }
                outcome = next_outcome(&mut in_flight) => {
                    in_flight = None;
                    self.monitor.finish(&outcome);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        if in_flight.is_some() {
                            warn!("shutting down with a check in flight, dropping it");
                        }
                        info!("monitor engine shutting down");
                        break;
                    }
                }
            }
        }

        self.monitor
    }
}

/// Resolve with the in-flight cycle's outcome, or never if nothing is running.
async fn next_outcome(slot: &mut Option<BoxFuture<'static, CycleOutcome>>) -> CycleOutcome {
    match slot {
        Some(cycle) => cycle.await,
        None => std::future::pending().await,
    }
}

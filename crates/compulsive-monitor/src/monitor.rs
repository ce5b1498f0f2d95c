use std::sync::Arc;

use compulsive_core::{EmailConfig, NotificationRequest};
use tracing::{error, info, warn};

use crate::{
    error::{MonitorError, Result},
    fetcher::Fetcher,
    notifier::Notifier,
    types::{CycleOutcome, MonitorState},
};

/// Set while a check cycle runs. Only [`ChangeMonitor`] touches it.
#[derive(Debug, Default)]
struct RunGuard {
    running: bool,
}

impl RunGuard {
    /// Take the guard. Returns false if a cycle already holds it.
    fn try_acquire(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    fn release(&mut self) {
        self.running = false;
    }
}

/// Owns the snapshot of the watched page and decides when to alert.
///
/// A check is split into three steps so that a driver can keep serving ticks
/// while the network calls are pending:
///
/// 1. [`try_begin`](Self::try_begin) takes the run guard (or drops the tick),
/// 2. [`CheckCycle::run`] fetches, compares and notifies,
/// 3. [`finish`](Self::finish) stores the new snapshot and releases the guard.
///
/// [`check`](Self::check) runs all three back to back.
pub struct ChangeMonitor {
    url: Arc<str>,
    email: Arc<EmailConfig>,
    fetcher: Arc<dyn Fetcher>,
    notifier: Arc<dyn Notifier>,
    snapshot: Arc<str>,
    guard: RunGuard,
}

impl ChangeMonitor {
    /// Fetch `url` once and use the body as the baseline snapshot.
    ///
    /// Fails with [`MonitorError::Seed`] if that first fetch fails: there is
    /// no meaningful comparison without a baseline.
    pub async fn seed(
        url: impl Into<String>,
        email: EmailConfig,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let url = url.into();
        let baseline = fetcher.fetch(&url).await.map_err(MonitorError::Seed)?;
        info!(%url, bytes = baseline.len(), "initial snapshot taken");
        Ok(Self::with_snapshot(url, email, fetcher, notifier, baseline))
    }

    /// Build a monitor around an already known baseline.
    pub fn with_snapshot(
        url: impl Into<String>,
        email: EmailConfig,
        fetcher: Arc<dyn Fetcher>,
        notifier: Arc<dyn Notifier>,
        snapshot: impl Into<String>,
    ) -> Self {
        Self {
            url: Arc::from(url.into()),
            email: Arc::new(email),
            fetcher,
            notifier,
            snapshot: Arc::from(snapshot.into()),
            guard: RunGuard::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Most recently observed page body.
    pub fn snapshot(&self) -> &str {
        &self.snapshot
    }

    pub fn state(&self) -> MonitorState {
        if self.guard.running {
            MonitorState::Checking
        } else {
            MonitorState::Idle
        }
    }

    /// Handle a timer tick: start a cycle, or return `None` if one is still running.
    ///
    /// The returned cycle holds the guard until it is passed back through
    /// [`finish`](Self::finish).
    pub fn try_begin(&mut self) -> Option<CheckCycle> {
        info!(url = %self.url, "checking url");
        if !self.guard.try_acquire() {
            warn!("check already running, skipping tick");
            return None;
        }

        Some(CheckCycle {
            url: Arc::clone(&self.url),
            email: Arc::clone(&self.email),
            fetcher: Arc::clone(&self.fetcher),
            notifier: Arc::clone(&self.notifier),
            baseline: Arc::clone(&self.snapshot),
        })
    }

    /// Apply a finished cycle and release the guard.
    ///
    /// Any detected change replaces the snapshot, including when the alert
    /// failed to send.
    pub fn finish(&mut self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Unchanged => {
                info!("no change detected");
            }
            CycleOutcome::Changed { content } | CycleOutcome::NotifyFailed { content, .. } => {
                self.snapshot = Arc::from(content.as_str());
                info!(bytes = content.len(), "snapshot updated");
            }
            CycleOutcome::FetchFailed(e) => {
                error!(url = %self.url, error = %e, "failed to fetch url, snapshot kept");
            }
        }
        self.guard.release();
    }

    /// Run one full cycle inline. `None` means the tick was dropped.
    pub async fn check(&mut self) -> Option<CycleOutcome> {
        let cycle = self.try_begin()?;
        let outcome = cycle.run().await;
        self.finish(&outcome);
        Some(outcome)
    }
}

/// One in-flight check. Owns everything it needs so it can run detached
/// from the monitor while the driver keeps handling ticks.
pub struct CheckCycle {
    url: Arc<str>,
    email: Arc<EmailConfig>,
    fetcher: Arc<dyn Fetcher>,
    notifier: Arc<dyn Notifier>,
    baseline: Arc<str>,
}

impl CheckCycle {
    /// Fetch, compare byte-for-byte with the baseline, and alert on a difference.
    ///
    /// Never fails: every error ends up inside the returned [`CycleOutcome`].
    pub async fn run(self) -> CycleOutcome {
        let content = match self.fetcher.fetch(&self.url).await {
            Ok(content) => content,
            Err(e) => return CycleOutcome::FetchFailed(e),
        };

        if content == *self.baseline {
            return CycleOutcome::Unchanged;
        }

        warn!(url = %self.url, "change detected in page");
        let request = NotificationRequest::for_change(&self.email, &self.url);
        let recipients: Vec<&str> = request
            .recipients
            .iter()
            .map(|r| r.address.as_str())
            .collect();
        info!(?recipients, "sending email notification");

        match self.notifier.send(&request).await {
            Ok(()) => {
                info!("mail sent");
                CycleOutcome::Changed { content }
            }
            Err(error) => {
                error!(error = %error, "failed to send change notification");
                CycleOutcome::NotifyFailed { content, error }
            }
        }
    }
}

//! Scripted fetcher and recording notifier shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use compulsive_core::{config::SmtpServerConfig, EmailConfig, Identity, NotificationRequest};

use crate::error::{FetchError, NotifyError};
use crate::fetcher::Fetcher;
use crate::notifier::Notifier;

pub const URL: &str = "http://localhost:3000";

/// One scripted fetch result.
#[derive(Debug, Clone)]
pub enum Step {
    Body(&'static str),
    Status(u16),
}

/// Replays `steps` in order, repeating the last one once the script runs out.
pub struct ScriptedFetcher {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self::with_delay(steps, Duration::ZERO)
    }

    /// Every fetch sleeps `delay` (tokio clock) before answering.
    pub fn with_delay(steps: impl IntoIterator<Item = Step>, delay: Duration) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            last: Mutex::new(None),
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = {
            let mut steps = self.steps.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            let step = steps
                .pop_front()
                .or_else(|| last.clone())
                .expect("fetcher script is empty");
            *last = Some(step.clone());
            step
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match step {
            Step::Body(body) => Ok(body.to_string()),
            Step::Status(status) => Err(FetchError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }
}

/// Records every send attempt; fails all of them when `failing` is set.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NotificationRequest>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.set_failing(true);
        notifier
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> Vec<NotificationRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, request: &NotificationRequest) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(request.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

pub fn email() -> EmailConfig {
    EmailConfig {
        server: SmtpServerConfig {
            hostname: "localhost".to_string(),
            port: 2525,
            auth: None,
            tls: false,
        },
        from: Identity::new("Compulsive", "bot@example.com"),
        to: vec![
            Identity::new("Alice", "alice@example.com"),
            Identity::new("Bob", "bob@example.com"),
        ],
        subject: "Page changed".to_string(),
        body: "The page changed".to_string(),
        html: false,
    }
}

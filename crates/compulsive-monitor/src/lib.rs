//! `compulsive-monitor`: polls one URL and mails the operator when it changes.
//!
//! # Overview
//!
//! A [`ChangeMonitor`] owns the last observed page body (the snapshot) and a
//! run guard. The [`MonitorEngine`] ticks at the configured interval and asks
//! the monitor to start a check; ticks that arrive while a check is still in
//! flight are dropped, never queued.
//!
//! # Check cycle outcomes
//!
//! | Outcome        | Notification | Snapshot          |
//! |----------------|--------------|-------------------|
//! | `Unchanged`    | none         | kept              |
//! | `Changed`      | sent         | replaced          |
//! | `NotifyFailed` | failed       | replaced anyway   |
//! | `FetchFailed`  | none         | kept              |

pub mod engine;
pub mod error;
pub mod fetcher;
pub mod monitor;
pub mod notifier;
pub mod types;

#[cfg(test)]
mod testing;

pub use engine::MonitorEngine;
pub use error::{FetchError, MonitorError, NotifyError};
pub use fetcher::{Fetcher, HttpFetcher};
pub use monitor::{ChangeMonitor, CheckCycle};
pub use notifier::{build_message, Notifier, SmtpNotifier};
pub use types::{CycleOutcome, MonitorState};

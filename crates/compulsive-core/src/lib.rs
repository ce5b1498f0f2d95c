//! `compulsive-core`: configuration and shared value types for the
//! compulsive page watcher.

pub mod config;
pub mod error;
pub mod types;

pub use config::{clamp_frequency, Config, EmailConfig, SmtpAuth, SmtpServerConfig};
pub use error::{CompulsiveError, Result};
pub use types::{Identity, NotificationRequest};

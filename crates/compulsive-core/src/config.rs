use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CompulsiveError, Result};
use crate::types::Identity;

pub const DEFAULT_CONFIG_PATH: &str = "compulsive.json";
pub const ENV_PREFIX: &str = "COMPULSIVE_";
/// Polling faster than this is never allowed; lower values are clamped up.
pub const MIN_FREQUENCY_SECS: u64 = 5;

/// Top-level config (compulsive.json + COMPULSIVE_* env overrides).
///
/// Immutable once [`Config::load`] returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Page to watch.
    pub url: String,
    /// Seconds between two checks. Clamped to [`MIN_FREQUENCY_SECS`] on load.
    pub frequency: i64,
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub server: SmtpServerConfig,
    pub from: Identity,
    pub to: Vec<Identity>,
    pub subject: String,
    pub body: String,
    /// Also send an HTML alternative part next to the plain-text body.
    #[serde(default)]
    pub html: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpServerConfig {
    pub hostname: String,
    pub port: u16,
    #[serde(default)]
    pub auth: Option<SmtpAuth>,
    /// Implicit TLS (SMTPS). When false the session is plaintext.
    #[serde(default)]
    pub tls: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpAuth {
    pub username: String,
    pub password: String,
}

impl Config {
    /// Load config from a JSON (or `.toml`) file with COMPULSIVE_* env var overrides.
    ///
    /// The returned value is validated and its frequency already clamped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CompulsiveError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let figment = if is_toml(path) {
            Figment::from(Toml::file(path))
        } else {
            Figment::from(Json::file(path))
        };

        let config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("_"))
            .extract()
            .map_err(|e| CompulsiveError::Config(e.to_string()))?;

        config.validated()
    }

    /// Check required fields and clamp the polling frequency.
    pub fn validated(mut self) -> Result<Self> {
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(CompulsiveError::InvalidConfig {
                field: "url",
                reason: "must not be empty".to_string(),
            });
        }
        let lower = url.to_ascii_lowercase();
        if !lower.starts_with("http://") && !lower.starts_with("https://") {
            return Err(CompulsiveError::InvalidConfig {
                field: "url",
                reason: format!("`{url}` is not an http(s) URL"),
            });
        }

        self.url = url;

        if self.email.to.is_empty() {
            return Err(CompulsiveError::InvalidConfig {
                field: "email.to",
                reason: "at least one recipient is required".to_string(),
            });
        }
        check_mailbox("email.from", &self.email.from)?;
        for recipient in &self.email.to {
            check_mailbox("email.to", recipient)?;
        }

        if self.email.server.port == 0 {
            return Err(CompulsiveError::InvalidConfig {
                field: "email.server.port",
                reason: "must be a non-zero port".to_string(),
            });
        }

        let clamped = clamp_frequency(self.frequency);
        if clamped as i64 != self.frequency {
            warn!(
                configured = self.frequency,
                applied = clamped,
                "frequency below minimum, clamping"
            );
            self.frequency = clamped as i64;
        }

        Ok(self)
    }

    /// Interval between two checks, never shorter than [`MIN_FREQUENCY_SECS`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(clamp_frequency(self.frequency))
    }
}

/// Clamp a configured frequency (seconds) to the allowed minimum.
pub fn clamp_frequency(secs: i64) -> u64 {
    u64::try_from(secs).unwrap_or(0).max(MIN_FREQUENCY_SECS)
}

fn check_mailbox(field: &'static str, identity: &Identity) -> Result<()> {
    identity
        .mailbox()
        .map(drop)
        .map_err(|e| CompulsiveError::InvalidConfig {
            field,
            reason: format!("`{}`: {e}", identity.address),
        })
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

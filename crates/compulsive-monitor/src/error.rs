use thiserror::Error;

/// Failure while retrieving the watched page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, TLS, body read, client setup).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered outside the 2xx range.
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
}

/// Failure while delivering a change alert.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// A sender or recipient address could not be parsed.
    #[error("Invalid address: {0}")]
    Address(String),

    /// The message could not be assembled.
    #[error("Failed to build email: {0}")]
    Build(String),

    /// The SMTP session failed (connect, auth, or delivery).
    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Errors that stop the monitor from starting.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The seed fetch failed, so there is no baseline to compare against.
    #[error("Initial fetch failed, no baseline snapshot: {0}")]
    Seed(#[source] FetchError),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

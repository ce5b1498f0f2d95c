use async_trait::async_trait;
use tracing::debug;

use crate::error::FetchError;

const USER_AGENT: &str = concat!("compulsive/", env!("CARGO_PKG_VERSION"));

/// Retrieves the current body of the watched page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform one GET against `url` and return the body as text.
    ///
    /// Any status outside 200–299 is an error; so is a transport failure.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
///
/// No timeout or retry is configured; redirects follow reqwest's defaults.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Use a preconfigured client (proxy settings, custom TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(%url, "fetching page");

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        debug!(%url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}

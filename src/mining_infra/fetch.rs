use std::time::Duration;
use reqwest::header::ACCEPT;
use reqwest::Response;
use tracing::{debug, warn};
use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// GET client with a per-request deadline.
///
/// A request that outlives its deadline is dropped, which closes its
/// connection; sibling requests are unaffected. Timeouts and network errors
/// both surface as [`Error::SourceUnavailable`].
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_retries: u32,
    retry_backoff: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        if config.timeout_ms == 0 {
            return Err(Error::ConfigError("fetch timeout_ms must be positive".to_string()));
        }
        if config.retry_backoff().checked_mul(config.max_retries).is_none() {
            return Err(Error::ConfigError(format!(
                "retry_backoff_ms {} overflows over {} retries",
                config.retry_backoff_ms, config.max_retries
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpFetcher {
            client,
            timeout: config.timeout(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
        })
    }

    /// Returns the response whatever its status; callers decide what a
    /// non-success status means. Only transport failures are retried.
    pub async fn fetch_with_timeout(&self, url: &str) -> Result<Response> {
        let mut attempt = 0;

        loop {
            match self.fetch_once(url).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(url, attempt, error = %e, "Fetch failed, retrying");
                    tokio::time::sleep(self.retry_backoff.saturating_mul(attempt)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Response> {
        debug!(url, timeout_ms = self.timeout.as_millis() as u64, "Sending request");

        let request = self.client
            .get(url)
            .header(ACCEPT, "application/json")
            .send();

        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(Error::SourceUnavailable {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(Error::SourceUnavailable {
                url: url.to_string(),
                reason: format!("timed out after {}ms", self.timeout.as_millis()),
            }),
        }
    }

    /// Reads the body under the same deadline as the request.
    pub async fn read_body(&self, url: &str, response: Response) -> Result<Vec<u8>> {
        match tokio::time::timeout(self.timeout, response.bytes()).await {
            Ok(Ok(body)) => Ok(body.to_vec()),
            Ok(Err(e)) => Err(Error::SourceUnavailable {
                url: url.to_string(),
                reason: format!("Failed to read response body: {}", e),
            }),
            Err(_) => Err(Error::SourceUnavailable {
                url: url.to_string(),
                reason: format!("body not received within {}ms", self.timeout.as_millis()),
            }),
        }
    }
}

//! HTTP page fetching with rate limiting and bounded retries.

use async_trait::async_trait;
use edgr_core::{Error, Headers, PageFetcher, Result};
use reqwest::{Client, Response, StatusCode};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// Timeout applied to every request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Base delay between attempts; the n-th retry waits n times this.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Rate limiter to ensure we don't exceed SEC's rate limits
#[derive(Debug)]
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// [`PageFetcher`] backed by `reqwest`.
///
/// Clones share one rate limiter, so every request made through any clone
/// counts against the same budget.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    headers: Headers,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    retry_delay: Duration,
}

impl HttpPageFetcher {
    /// Create a fetcher that identifies itself with `user_agent`.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    #[must_use]
    pub fn new(user_agent: &str) -> Self {
        Self::with_client(Client::new()).with_header("User-Agent", user_agent)
    }

    /// Create a fetcher around a pre-configured client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            headers: Headers::new(),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(DEFAULT_RATE_LIMIT))),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the minimum interval between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, min_interval: Duration) -> Self {
        self.rate_limiter = Arc::new(Mutex::new(RateLimiter::new(min_interval)));
        self
    }

    /// Set the base delay between attempts.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Issue a rate-limited GET with the default headers plus `headers`.
    ///
    /// Per-call headers replace default headers of the same name.
    pub async fn get(&self, url: &str, headers: &Headers) -> Result<Response> {
        let merged: BTreeMap<&str, &str> = self
            .headers
            .iter()
            .chain(headers.iter())
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        self.rate_limiter.lock().await.wait().await;

        debug!("GET {}", url);
        let mut request = self.client.get(url).timeout(REQUEST_TIMEOUT);
        for (name, value) in merged {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                provider: "SEC EDGAR".to_string(),
                retry_after: None,
            });
        }

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        Ok(response)
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        self.get(url, &Headers::new())
            .await?
            .text()
            .await
            .map_err(|e| Error::Network(format!("error reading {url}: {e}")))
    }
}

/// Delay before retry number `attempt`: `attempt` times the base delay.
fn backoff(base: Duration, attempt: usize) -> Duration {
    base.saturating_mul(u32::try_from(attempt).unwrap_or(u32::MAX))
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, url: &str, attempts: usize) -> Result<String> {
        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(e) if attempt < attempts => {
                    debug!(url, attempt, error = %e, "page fetch failed, retrying");
                    sleep(backoff(self.retry_delay, attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/piquette/edgr/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR filer lookup and filing discovery.
//!
//! This crate provides:
//!
//! - Filer resolution from ticker symbols via the company lookup feed
//! - Filing discovery over `/Archives/edgar/data/<cik>` listing pages
//! - Index-page scraping into [`SecFiling`] records
//!
//! # Example
//!
//! ```no_run
//! use edgr_sec::SecProvider;
//! use edgr_core::{FilingSource, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = SecProvider::new("MyApp/1.0 (contact@example.com)");
//!
//!     let filer = provider.filer(&Symbol::new("AAPL")).await?;
//!     println!("{} (CIK {})", filer.name, filer.cik);
//!
//!     let filings = provider.list_filings(&filer.cik, "10-K", "2020-01-01").await?;
//!     for f in filings {
//!         println!("{} {} {}", f.filing.form_type, f.filing.edgar_time, f.docs.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use edgr_core::{
    Error, Filer, FilerResolver, FilingBuilder, FilingSource, Headers, LinkExtractor, PageFetcher,
    Provider, Result, SecFiling, Symbol,
};
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use tracing::debug;

mod fetch;
mod filer;
mod index;
mod links;
mod traversal;

pub use fetch::HttpPageFetcher;
pub use index::{IndexPageBuilder, parse_index_page};
pub use links::RegexLinkExtractor;
pub use traversal::{
    Decision, FilingQuery, FilingTraversal, SkipReason, SkippedEntry, TraversalReport,
};

/// SEC website base URL
const SEC_BASE_URL: &str = "https://www.sec.gov";

/// Path of the per-filer archive directories.
const ARCHIVE_PATH: &str = "/Archives/edgar/data/";

/// Attempts made for every listing or index page.
const PAGE_ATTEMPTS: usize = 2;

/// SEC EDGAR provider.
///
/// Resolves filers from the company lookup feed and walks the filings archive.
/// All requests share one rate limiter (max 10 requests/second, per SEC policy).
#[derive(Debug, Clone)]
pub struct SecProvider {
    http: HttpPageFetcher,
    archive_host: String,
    fetcher: Option<Arc<dyn PageFetcher>>,
    extractor: Arc<dyn LinkExtractor>,
    builder: Option<Arc<dyn FilingBuilder>>,
}

impl SecProvider {
    /// Create a new SEC provider with the specified user agent.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Example
    /// ```
    /// use edgr_sec::SecProvider;
    ///
    /// let provider = SecProvider::new("MyApp/1.0 (contact@example.com)");
    /// ```
    #[must_use]
    pub fn new(user_agent: &str) -> Self {
        Self::with_http(HttpPageFetcher::new(user_agent))
    }

    /// Create a new SEC provider around a configured HTTP fetcher.
    #[must_use]
    pub fn with_http(http: HttpPageFetcher) -> Self {
        Self {
            http,
            archive_host: SEC_BASE_URL.to_string(),
            fetcher: None,
            extractor: Arc::new(RegexLinkExtractor),
            builder: None,
        }
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.http = self.http.with_header(name, value);
        self
    }

    /// Use a different host for both the company lookup and the archive.
    #[must_use]
    pub fn with_archive_host(mut self, host: impl Into<String>) -> Self {
        self.archive_host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch listing and index pages through `fetcher` instead of HTTP.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Extract directory and index links with `extractor`.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Build filings with `builder` instead of scraping index pages.
    #[must_use]
    pub fn with_builder(mut self, builder: Arc<dyn FilingBuilder>) -> Self {
        self.builder = Some(builder);
        self
    }

    /// Company lookup URL for a ticker.
    #[must_use]
    pub fn company_lookup_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/cgi-bin/browse-edgar?action=getcompany&CIK={}&start=0&count=1&output=atom",
            self.archive_host,
            symbol.as_str()
        )
    }

    /// The traversal engine wired with this provider's collaborators.
    #[must_use]
    pub fn traversal(&self) -> FilingTraversal {
        let fetcher = self
            .fetcher
            .clone()
            .unwrap_or_else(|| Arc::new(self.http.clone()));
        let builder = self
            .builder
            .clone()
            .unwrap_or_else(|| Arc::new(IndexPageBuilder::new(fetcher.clone())));

        FilingTraversal::new(fetcher, self.extractor.clone(), builder)
            .with_archive_host(self.archive_host.clone())
    }

    /// Resolve a filer using only the default headers.
    pub async fn filer(&self, symbol: &Symbol) -> Result<Filer> {
        self.resolve_filer(symbol, &Headers::new()).await
    }

    /// Walk a filer's directory and return filings plus per-entry diagnostics.
    pub async fn traverse(&self, query: &FilingQuery) -> Result<TraversalReport> {
        self.traversal().run(query).await
    }

    /// List filings for a ticker: resolve its filer, then walk the filer's directory.
    ///
    /// Returned filings carry `symbol` as their symbol.
    pub async fn list_filings_for_symbol(
        &self,
        symbol: &Symbol,
        form_type: &str,
        stop_date: &str,
    ) -> Result<Vec<SecFiling>> {
        let query = FilingQuery::parse("", form_type, stop_date)?;
        let filer = self.filer(symbol).await?;
        let query = FilingQuery {
            filer_id: filer.cik,
            ..query
        }
        .with_symbol(symbol.as_str());

        Ok(self.traverse(&query).await?.filings)
    }
}

impl Provider for SecProvider {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    fn description(&self) -> &str {
        "SEC EDGAR filer lookup and filing archive traversal"
    }
}

#[async_trait]
impl FilerResolver for SecProvider {
    async fn resolve_filer(&self, symbol: &Symbol, headers: &Headers) -> Result<Filer> {
        let url = self.company_lookup_url(symbol);
        debug!("Resolving filer for {}", symbol);

        let response = self.http.get(&url, headers).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("error reading company feed: {e}")))?;

        let body = filer::decode_body(&bytes, content_type.as_deref());
        let filer = filer::parse_filer(symbol, &body)?;
        debug!("Found CIK {} for ticker {}", filer.cik, symbol);
        Ok(filer)
    }
}

#[async_trait]
impl FilingSource for SecProvider {
    async fn list_filings(
        &self,
        filer_id: &str,
        form_type: &str,
        stop_date: &str,
    ) -> Result<Vec<SecFiling>> {
        let query = FilingQuery::parse(filer_id, form_type, stop_date)?;
        Ok(self.traverse(&query).await?.filings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fetcher that records requests and has no pages.
    #[derive(Debug, Default)]
    struct RecordingFetcher {
        requests: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageFetcher for RecordingFetcher {
        async fn fetch_page(&self, url: &str, _attempts: usize) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            Err(Error::Network(format!("no page at {url}")))
        }
    }

    #[test]
    fn test_provider_traits() {
        let provider = SecProvider::new("Test/1.0 (test@example.com)");

        assert_eq!(provider.name(), "SEC EDGAR");
        assert!(!provider.description().is_empty());
    }

    #[test]
    fn test_company_lookup_url() {
        let provider = SecProvider::new("Test/1.0 (test@example.com)");
        assert_eq!(
            provider.company_lookup_url(&Symbol::new("aapl")),
            "https://www.sec.gov/cgi-bin/browse-edgar?action=getcompany&CIK=AAPL&start=0&count=1&output=atom"
        );
    }

    #[test]
    fn test_archive_host_override() {
        let provider = SecProvider::new("Test/1.0 (test@example.com)")
            .with_archive_host("http://localhost:8080/");
        assert_eq!(
            provider.traversal().directory_url("320193"),
            "http://localhost:8080/Archives/edgar/data/320193"
        );
    }

    #[tokio::test]
    async fn test_bad_stop_date_fails_before_fetching() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let provider =
            SecProvider::new("Test/1.0 (test@example.com)").with_fetcher(fetcher.clone());

        let err = provider
            .list_filings("320193", "", "2023-1-1x")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)), "got {err:?}");
        assert!(fetcher.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_directory_failure_is_fatal() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let provider =
            SecProvider::new("Test/1.0 (test@example.com)").with_fetcher(fetcher.clone());

        let err = provider.list_filings("320193", "", "").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)), "got {err:?}");
        assert_eq!(
            *fetcher.requests.lock().unwrap(),
            vec!["https://www.sec.gov/Archives/edgar/data/320193".to_string()]
        );
    }
}

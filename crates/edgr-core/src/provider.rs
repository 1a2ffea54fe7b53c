//! Provider and collaborator traits.
//!
//! This module defines the seams between the clients and the traversal engine:
//!
//! - [`Provider`] - Base trait for all providers
//! - [`CompanyDirectory`] - Listed companies from a market-data API
//! - [`FilerResolver`] - Ticker to filer resolution
//! - [`FilingSource`] - Filing discovery for one filer
//! - [`PageFetcher`] - Raw page retrieval with a bounded attempt budget
//! - [`LinkExtractor`] - Pattern-based link extraction from listing pages
//! - [`FilingBuilder`] - Filing construction from an index page

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{Company, Filer, SecFiling, Symbol},
};

/// Header name to value, applied verbatim to outgoing requests.
pub type Headers = HashMap<String, String>;

/// Query parameter name to value, URL-encoded on send.
pub type QueryParams = HashMap<String, String>;

/// Base trait for all providers.
pub trait Provider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "SEC EDGAR").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider of listed-company reference data.
#[async_trait]
pub trait CompanyDirectory: Provider {
    /// Lists every public company known to the provider.
    ///
    /// `query` must carry whatever authentication the provider requires;
    /// `headers` are merged over the provider's default headers.
    async fn list_public_companies(
        &self,
        query: &QueryParams,
        headers: &Headers,
    ) -> Result<Vec<Company>>;
}

/// Resolves ticker symbols to filing entities.
#[async_trait]
pub trait FilerResolver: Provider {
    /// Resolves a single filer from its ticker symbol.
    async fn resolve_filer(&self, symbol: &Symbol, headers: &Headers) -> Result<Filer>;
}

/// Discovers the filings of one filer.
#[async_trait]
pub trait FilingSource: Provider {
    /// Lists filings for `filer_id`, newest first.
    ///
    /// * `form_type` - keep only this form type; empty keeps everything
    /// * `stop_date` - `YYYY-MM-DD`; traversal stops at the first filing accepted
    ///   before this date. Empty means no cutoff.
    async fn list_filings(
        &self,
        filer_id: &str,
        form_type: &str,
        stop_date: &str,
    ) -> Result<Vec<SecFiling>>;
}

/// Fetches raw page content.
#[async_trait]
pub trait PageFetcher: Send + Sync + Debug {
    /// Fetches `url`, trying at most `attempts` times before giving up.
    async fn fetch_page(&self, url: &str, attempts: usize) -> Result<String>;
}

/// Pulls candidate URLs out of archive listing pages.
///
/// The traversal depends on these two methods only.
pub trait LinkExtractor: Send + Sync + Debug {
    /// Every sub-directory link on a filer's directory page, in page order.
    fn extract_directory_links(&self, page: &str) -> Vec<String>;

    /// The first index-page link on a sub-directory listing.
    fn extract_index_link(&self, page: &str) -> Option<String>;
}

/// Builds filing records from index pages.
#[async_trait]
pub trait FilingBuilder: Send + Sync + Debug {
    /// Builds the filing described by the index page at `index_url`.
    async fn build_filing(&self, filer_id: &str, index_url: &str) -> Result<SecFiling>;
}

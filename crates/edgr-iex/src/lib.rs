#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/piquette/edgr/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! IEX Cloud reference-data provider.
//!
//! This crate implements [`CompanyDirectory`] for the
//! [IEX Cloud](https://iexcloud.io/) symbols endpoint.
//!
//! # Usage
//!
//! ```rust,ignore
//! use edgr_iex::IexProvider;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = IexProvider::new().with_token("your_token");
//!
//!     for company in provider.companies().await? {
//!         println!("{} {}", company.symbol, company.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use edgr_core::{Company, CompanyDirectory, Error, Headers, Provider, QueryParams, Result};
use reqwest::Client;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// IEX Cloud reference-data symbols endpoint.
const IEX_SYMBOLS_URL: &str = "https://api.iex.cloud/v1/data/core/REF_DATA/symbols";

/// Query parameter carrying the API token.
const TOKEN_PARAM: &str = "token";

/// Timeout applied to every request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// IEX Cloud reference-data provider.
#[derive(Clone)]
pub struct IexProvider {
    client: Client,
    symbols_url: String,
    token: Option<String>,
    headers: Headers,
}

impl fmt::Debug for IexProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IexProvider")
            .field("symbols_url", &self.symbols_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for IexProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IexProvider {
    /// Create a new IEX provider without a default token.
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create a new IEX provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            symbols_url: IEX_SYMBOLS_URL.to_string(),
            token: None,
            headers: Headers::new(),
        }
    }

    /// Set the token sent when a call does not supply its own.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Point the provider at a different symbols endpoint (e.g. the sandbox).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.symbols_url = url.into();
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// List public companies using the configured token and headers.
    pub async fn companies(&self) -> Result<Vec<Company>> {
        self.list_public_companies(&QueryParams::new(), &Headers::new())
            .await
    }

    /// Merge call parameters over the default token.
    fn query_params<'a>(&'a self, query: &'a QueryParams) -> BTreeMap<&'a str, &'a str> {
        let mut params = BTreeMap::new();
        if let Some(token) = &self.token {
            params.insert(TOKEN_PARAM, token.as_str());
        }
        for (k, v) in query {
            params.insert(k.as_str(), v.as_str());
        }
        params
    }

    /// Merge call headers over the default headers.
    fn request_headers<'a>(&'a self, headers: &'a Headers) -> BTreeMap<&'a str, &'a str> {
        self.headers
            .iter()
            .chain(headers.iter())
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Decode the symbols endpoint's JSON array.
///
/// On failure the raw body is included in the error.
fn parse_companies(body: &str) -> Result<Vec<Company>> {
    serde_json::from_str(body)
        .map_err(|e| Error::Parse(format!("error unmarshaling companies ({e}): {body}")))
}

impl Provider for IexProvider {
    fn name(&self) -> &str {
        "IEX Cloud"
    }

    fn description(&self) -> &str {
        "IEX Cloud reference data for listed securities"
    }
}

#[async_trait]
impl CompanyDirectory for IexProvider {
    async fn list_public_companies(
        &self,
        query: &QueryParams,
        headers: &Headers,
    ) -> Result<Vec<Company>> {
        let params = self.query_params(query);
        if !params.get(TOKEN_PARAM).is_some_and(|t| !t.is_empty()) {
            return Err(Error::Configuration(format!(
                "to access the endpoint at {}, you must include the '{TOKEN_PARAM}' in the query parameters",
                self.symbols_url
            )));
        }

        tracing::debug!("IEX request: {}", self.symbols_url);

        let mut request = self
            .client
            .get(&self.symbols_url)
            .query(&params)
            .timeout(REQUEST_TIMEOUT);
        for (name, value) in self.request_headers(headers) {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                provider: "IEX Cloud".to_string(),
                retry_after: None,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("error reading response body: {e}")))?;

        let companies = parse_companies(&text)?;
        tracing::debug!("IEX returned {} companies", companies.len());
        Ok(companies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_metadata() {
        let provider = IexProvider::new();
        assert_eq!(provider.name(), "IEX Cloud");
        assert!(!provider.description().is_empty());
    }

    #[test]
    fn test_debug_redacts_token() {
        let provider = IexProvider::new().with_token("secret_token_12345");
        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token_12345"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_call_parameters_override_default_token() {
        let provider = IexProvider::new().with_token("default");
        let mut query = QueryParams::new();
        query.insert("token".to_string(), "override".to_string());
        query.insert("format".to_string(), "json".to_string());

        let params = provider.query_params(&query);
        assert_eq!(params.get("token"), Some(&"override"));
        assert_eq!(params.get("format"), Some(&"json"));
    }

    #[test]
    fn test_call_headers_override_defaults() {
        let provider = IexProvider::new()
            .with_header("User-Agent", "edgr/0.1")
            .with_header("Accept", "application/json");
        let mut headers = Headers::new();
        headers.insert("User-Agent".to_string(), "custom".to_string());

        let merged = provider.request_headers(&headers);
        assert_eq!(merged.get("User-Agent"), Some(&"custom"));
        assert_eq!(merged.get("Accept"), Some(&"application/json"));
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_request() {
        // Unroutable endpoint: any request attempt would surface as a network error.
        let provider = IexProvider::new().with_base_url("http://127.0.0.1:9/symbols");

        let err = provider.companies().await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "got {err:?}");

        let mut query = QueryParams::new();
        query.insert("token".to_string(), String::new());
        let err = provider
            .list_public_companies(&query, &Headers::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "got {err:?}");
    }

    #[test]
    fn test_parse_companies() {
        let body = r#"[
            {"symbol":"A","name":"Agilent Technologies Inc.","exchange":"XNYS","isEnabled":true,"type":"cs","region":"US","currency":"USD","iexId":"IEX_46574843354B2D52"},
            {"symbol":"AA","name":"Alcoa Corp","exchange":"XNYS","isEnabled":true,"type":"cs","region":"US","currency":"USD","iexId":"IEX_4238333734532D52"}
        ]"#;

        let companies = parse_companies(body).unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].symbol, "A");
        assert_eq!(companies[1].name, "Alcoa Corp");
    }

    #[test]
    fn test_parse_error_includes_body() {
        let body = r#"{"error":"Invalid API token"}"#;
        let err = parse_companies(body).unwrap_err();
        match err {
            Error::Parse(msg) => assert!(msg.contains("Invalid API token")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

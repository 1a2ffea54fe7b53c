//! Client routing requests across registered providers with fallback.

use std::sync::Arc;

use tracing::{debug, warn};

use edgr_core::{
    Company, CompanyDirectory, Error, Filer, FilerResolver, FilingSource, Headers, QueryParams,
    Result, SecFiling, Symbol,
};

/// Client over company directories, filer resolvers and filing sources.
///
/// Providers are registered per capability and tried in registration order
/// until one succeeds.
///
/// # Example
///
/// ```rust,ignore
/// use edgr::{Edgr, Symbol};
///
/// let client = Edgr::new()
///     .with_iex("pk_...")
///     .with_sec("MyApp/1.0 (contact@example.com)");
///
/// let filer = client.resolve_filer(&Symbol::new("AAPL"), &Default::default()).await?;
/// let filings = client.list_filings(&filer.cik, "10-Q", "2023-01-01").await?;
/// ```
#[derive(Default)]
pub struct Edgr {
    directories: Vec<Arc<dyn CompanyDirectory>>,
    resolvers: Vec<Arc<dyn FilerResolver>>,
    sources: Vec<Arc<dyn FilingSource>>,
}

impl std::fmt::Debug for Edgr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Edgr")
            .field(
                "directories",
                &self.directories.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "resolvers",
                &self.resolvers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "sources",
                &self.sources.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Edgr {
    /// Create a client with no providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a company directory.
    pub fn register_directory(&mut self, provider: Arc<dyn CompanyDirectory>) {
        debug!(provider = provider.name(), "Registering company directory");
        self.directories.push(provider);
    }

    /// Register a filer resolver.
    pub fn register_resolver(&mut self, provider: Arc<dyn FilerResolver>) {
        debug!(provider = provider.name(), "Registering filer resolver");
        self.resolvers.push(provider);
    }

    /// Register a filing source.
    pub fn register_source(&mut self, provider: Arc<dyn FilingSource>) {
        debug!(provider = provider.name(), "Registering filing source");
        self.sources.push(provider);
    }

    /// List public companies, trying directories in order until one succeeds.
    pub async fn list_public_companies(
        &self,
        query: &QueryParams,
        headers: &Headers,
    ) -> Result<Vec<Company>> {
        if self.directories.is_empty() {
            return Err(Error::Configuration(
                "No company directories registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.directories {
            debug!(provider = provider.name(), "Listing public companies");

            match provider.list_public_companies(query, headers).await {
                Ok(companies) => return Ok(companies),
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Other("All providers failed".to_string())))
    }

    /// Resolve a filer, trying resolvers in order until one succeeds.
    pub async fn resolve_filer(&self, symbol: &Symbol, headers: &Headers) -> Result<Filer> {
        if self.resolvers.is_empty() {
            return Err(Error::Configuration(
                "No filer resolvers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.resolvers {
            debug!(provider = provider.name(), symbol = %symbol, "Resolving filer");

            match provider.resolve_filer(symbol, headers).await {
                Ok(filer) => return Ok(filer),
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Other("All providers failed".to_string())))
    }

    /// List a filer's filings, trying sources in order until one succeeds.
    ///
    /// Invalid arguments are reported immediately rather than retried on the
    /// next source.
    pub async fn list_filings(
        &self,
        filer_id: &str,
        form_type: &str,
        stop_date: &str,
    ) -> Result<Vec<SecFiling>> {
        if self.sources.is_empty() {
            return Err(Error::Configuration(
                "No filing sources registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.sources {
            debug!(provider = provider.name(), filer_id, "Listing filings");

            match provider.list_filings(filer_id, form_type, stop_date).await {
                Ok(filings) => return Ok(filings),
                Err(e @ Error::InvalidParameter(_)) => return Err(e),
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Other("All providers failed".to_string())))
    }

    /// Resolve `symbol` to its filer and list that filer's filings.
    ///
    /// Every returned filing is attributed to `symbol`.
    pub async fn list_filings_for_symbol(
        &self,
        symbol: &Symbol,
        form_type: &str,
        stop_date: &str,
    ) -> Result<Vec<SecFiling>> {
        let filer = self.resolve_filer(symbol, &Headers::new()).await?;
        let mut filings = self.list_filings(&filer.cik, form_type, stop_date).await?;

        for sec_filing in &mut filings {
            let filing = &mut sec_filing.filing;
            filing.symbol = symbol.to_string();
            filing.all_symbols = vec![filing.symbol.clone()];
        }
        Ok(filings)
    }

    /// Add the IEX Cloud company directory.
    #[cfg(feature = "iex")]
    #[must_use]
    pub fn with_iex(mut self, token: &str) -> Self {
        let provider = Arc::new(edgr_iex::IexProvider::new().with_token(token));
        self.register_directory(provider);
        self
    }

    /// Add the SEC EDGAR filer resolver and filing source.
    #[cfg(feature = "sec")]
    #[must_use]
    pub fn with_sec(mut self, user_agent: &str) -> Self {
        let provider = Arc::new(edgr_sec::SecProvider::new(user_agent));
        self.register_resolver(provider.clone());
        self.register_source(provider);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use edgr_core::{Filing, Provider};

    fn filing(filer_id: &str, accession: &str) -> SecFiling {
        let date = NaiveDate::from_ymd_opt(2023, 11, 3).unwrap();
        let filing = Filing::new(
            filer_id,
            accession,
            "10-K",
            date.and_hms_opt(18, 8, 27).unwrap(),
            date,
        );
        SecFiling::new(filing, Vec::new())
    }

    #[derive(Debug)]
    struct StaticSource {
        name: &'static str,
        result: fn(&str) -> Result<Vec<SecFiling>>,
    }

    impl Provider for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "canned filings"
        }
    }

    #[async_trait]
    impl FilingSource for StaticSource {
        async fn list_filings(
            &self,
            filer_id: &str,
            _form_type: &str,
            _stop_date: &str,
        ) -> Result<Vec<SecFiling>> {
            (self.result)(filer_id)
        }
    }

    #[async_trait]
    impl FilerResolver for StaticSource {
        async fn resolve_filer(&self, symbol: &Symbol, _headers: &Headers) -> Result<Filer> {
            Ok(Filer {
                cik: "320193".to_string(),
                symbol: symbol.clone(),
                sic: "3571".to_string(),
                sic_description: "ELECTRONIC COMPUTERS".to_string(),
                name: "Apple Inc.".to_string(),
            })
        }
    }

    fn failing() -> Arc<StaticSource> {
        Arc::new(StaticSource {
            name: "down",
            result: |_| Err(Error::Network("HTTP 503".to_string())),
        })
    }

    fn working() -> Arc<StaticSource> {
        Arc::new(StaticSource {
            name: "up",
            result: |filer_id| Ok(vec![filing(filer_id, "0000320193-23-000106")]),
        })
    }

    #[test]
    fn test_debug_lists_provider_names() {
        let mut client = Edgr::new();
        client.register_source(working());
        let debug = format!("{client:?}");
        assert!(debug.contains("sources: [\"up\"]"), "{debug}");
    }

    #[tokio::test]
    async fn test_empty_client_is_a_configuration_error() {
        let client = Edgr::new();

        let err = client.list_filings("320193", "", "").await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = client
            .resolve_filer(&Symbol::new("AAPL"), &Headers::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));

        let err = client
            .list_public_companies(&QueryParams::new(), &Headers::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_falls_back_to_next_source() {
        let mut client = Edgr::new();
        client.register_source(failing());
        client.register_source(working());

        let filings = client.list_filings("320193", "", "").await.unwrap();
        assert_eq!(filings.len(), 1);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_all_fail() {
        let mut client = Edgr::new();
        client.register_source(failing());

        let err = client.list_filings("320193", "", "").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn test_invalid_parameter_is_not_retried() {
        let mut client = Edgr::new();
        client.register_source(Arc::new(StaticSource {
            name: "strict",
            result: |_| Err(Error::InvalidParameter("bad stop date".to_string())),
        }));
        client.register_source(working());

        let err = client.list_filings("320193", "", "x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_filings_for_symbol_are_attributed_to_it() {
        let mut client = Edgr::new();
        let provider = working();
        client.register_resolver(provider.clone());
        client.register_source(provider);

        let filings = client
            .list_filings_for_symbol(&Symbol::new("aapl"), "", "")
            .await
            .unwrap();

        assert_eq!(filings.len(), 1);
        assert_eq!(filings[0].filing.filer_id, "320193");
        assert_eq!(filings[0].filing.symbol, "AAPL");
        assert_eq!(filings[0].filing.all_symbols, vec!["AAPL".to_string()]);
    }
}

//! Error types for edgr operations.
//!
//! This module defines [`Error`] which covers every failure that can be surfaced
//! to a caller when listing companies, resolving filers, or traversing filings.

use thiserror::Error;

/// Errors that can occur while talking to the market-data API or the filings archive.
#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing (e.g. an API token). Raised before any request.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network-related errors (connection failures, timeouts, non-success status).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// A JSON, XML or HTML payload could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The company lookup feed decoded but carried no CIK.
    #[error("no cik found in response data for {symbol}")]
    MissingCik {
        /// Symbol that was looked up.
        symbol: String,
    },

    /// The company lookup feed decoded but carried no conformed name.
    #[error("no name found in response data for {symbol}")]
    MissingName {
        /// Symbol that was looked up.
        symbol: String,
    },

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_messages_name_the_field() {
        let cik = Error::MissingCik {
            symbol: "AAPL".to_string(),
        };
        let name = Error::MissingName {
            symbol: "AAPL".to_string(),
        };

        assert!(cik.to_string().contains("no cik"));
        assert!(name.to_string().contains("no name"));
        assert!(cik.to_string().contains("AAPL"));
    }
}

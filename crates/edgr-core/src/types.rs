//! Core data types for company and filing records.
//!
//! This module defines the records produced by the providers:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Company`] - Listed security from the market-data symbols feed
//! - [`Filer`] - Resolved filing entity from the archive's company lookup
//! - [`Filing`] - A single regulatory submission
//! - [`Document`] - A file attached to a filing
//! - [`SecFiling`] - A filing together with its documents

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Listed security as reported by the market-data symbols endpoint.
///
/// Every string field tolerates `null` or absence in the payload and decodes
/// to an empty string, so a decoded record always re-encodes to the same keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    /// SEC CIK, when the provider knows it.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cik: String,
    /// Trading currency.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub currency: String,
    /// Date the reference record was generated.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    /// Primary exchange code.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exchange: String,
    /// Primary exchange name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exchange_name: String,
    /// Exchange segment code.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exchange_segment: String,
    /// Exchange segment name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exchange_segment_name: String,
    /// Exchange suffix appended to local symbols.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exchange_suffix: String,
    /// OpenFIGI identifier.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub figi: String,
    /// Exchange-assigned identifier.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub iex_id: String,
    /// Whether the symbol is enabled for trading.
    #[serde(default)]
    pub is_enabled: bool,
    /// Legal entity identifier.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub lei: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Region (country) code.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub region: String,
    /// Ticker symbol.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub symbol: String,
    /// Security type code (e.g. `cs`, `et`).
    #[serde(default, rename = "type", deserialize_with = "null_as_empty")]
    pub security_type: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A filing entity resolved from the archive's company lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filer {
    /// Central Index Key, as the archive formats it.
    pub cik: String,
    /// Ticker the filer was resolved from.
    pub symbol: Symbol,
    /// Standard Industrial Classification code. May be empty.
    pub sic: String,
    /// SIC description. May be empty.
    pub sic_description: String,
    /// Conformed legal name.
    pub name: String,
}

/// A single regulatory submission, as described by its index page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    /// Identifier of the filer whose directory the filing was found in.
    pub filer_id: String,
    /// Accession number (e.g. `0000320193-23-000106`).
    pub accession_number: String,
    /// Form type code (e.g. `10-K`).
    pub form_type: String,
    /// Time the archive accepted the submission.
    pub edgar_time: NaiveDateTime,
    /// Filing date.
    pub filed_date: NaiveDate,
    /// Reporting period, when the form has one.
    pub period_of_report: Option<NaiveDate>,
    /// Symbol the filing was queried under.
    pub symbol: String,
    /// Every symbol the filing is associated with.
    pub all_symbols: Vec<String>,
}

impl Filing {
    /// Creates a filing with the fields every index page carries.
    ///
    /// `symbol` defaults to the filer identifier until a ticker is stamped on.
    #[must_use]
    pub fn new(
        filer_id: impl Into<String>,
        accession_number: impl Into<String>,
        form_type: impl Into<String>,
        edgar_time: NaiveDateTime,
        filed_date: NaiveDate,
    ) -> Self {
        let filer_id = filer_id.into();
        Self {
            symbol: filer_id.clone(),
            filer_id,
            accession_number: accession_number.into(),
            form_type: form_type.into(),
            edgar_time,
            filed_date,
            period_of_report: None,
            all_symbols: Vec::new(),
        }
    }

    /// Sets the reporting period.
    #[must_use]
    pub const fn with_period_of_report(mut self, period: NaiveDate) -> Self {
        self.period_of_report = Some(period);
        self
    }

    /// Sets the symbol the filing is attributed to.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }
}

/// A file attached to a filing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Position in the index page's document table, when numbered.
    pub sequence: Option<u32>,
    /// Free-text description.
    pub description: String,
    /// File name.
    pub name: String,
    /// Absolute URL of the file.
    pub url: String,
    /// Document type (e.g. `10-K`, `EX-31.1`, `GRAPHIC`).
    pub doc_type: String,
    /// Size in bytes, when listed.
    pub size: Option<u64>,
}

/// A filing together with the documents it owns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecFiling {
    /// The filing record.
    pub filing: Filing,
    /// Documents in index-page order.
    pub docs: Vec<Document>,
}

impl SecFiling {
    /// Pairs a filing with its documents.
    #[must_use]
    pub const fn new(filing: Filing, docs: Vec<Document>) -> Self {
        Self { filing, docs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_uppercases() {
        assert_eq!(Symbol::new("aapl").as_str(), "AAPL");
        assert_eq!(Symbol::from("msft").to_string(), "MSFT");
    }

    #[test]
    fn test_company_decodes_nulls_as_empty() {
        let json = r#"{
            "symbol": "A",
            "exchange": "XNYS",
            "name": "Agilent Technologies Inc.",
            "date": "2024-01-05",
            "type": "cs",
            "iexId": "IEX_46574843354B2D52",
            "region": "US",
            "currency": "USD",
            "isEnabled": true,
            "figi": "BBG000C2V3D6",
            "cik": "0001090872",
            "lei": null
        }"#;

        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.symbol, "A");
        assert_eq!(company.security_type, "cs");
        assert_eq!(company.iex_id, "IEX_46574843354B2D52");
        assert!(company.is_enabled);
        assert_eq!(company.lei, "");
        assert_eq!(company.exchange_suffix, "");
    }

    #[test]
    fn test_company_round_trip() {
        let companies = vec![
            Company {
                symbol: "AAPL".to_string(),
                name: "Apple Inc".to_string(),
                exchange: "NAS".to_string(),
                region: "US".to_string(),
                currency: "USD".to_string(),
                is_enabled: true,
                security_type: "cs".to_string(),
                ..Default::default()
            },
            Company {
                symbol: "SPY".to_string(),
                name: "SPDR S&P 500 ETF Trust".to_string(),
                security_type: "et".to_string(),
                ..Default::default()
            },
        ];

        let encoded = serde_json::to_string(&companies).unwrap();
        assert!(encoded.contains("\"isEnabled\""));
        assert!(encoded.contains("\"type\""));

        let decoded: Vec<Company> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, companies);
    }

    #[test]
    fn test_filing_symbol_defaults_to_filer_id() {
        let filed = NaiveDate::from_ymd_opt(2023, 11, 3).unwrap();
        let filing = Filing::new(
            "320193",
            "0000320193-23-000106",
            "10-K",
            filed.and_hms_opt(18, 8, 27).unwrap(),
            filed,
        );
        assert_eq!(filing.symbol, "320193");
        assert!(filing.all_symbols.is_empty());

        let filing = filing.with_symbol("AAPL");
        assert_eq!(filing.symbol, "AAPL");
        assert_eq!(filing.filer_id, "320193");
    }
}

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/piquette/edgr/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR filings and listed-company reference data.
//!
//! This crate re-exports the core types and provider implementations, and
//! provides an [`Edgr`] client that routes requests across registered
//! providers, falling back to the next one on failure.
//!
//! # Features
//!
//! - `iex` - IEX Cloud company directory
//! - `sec` - SEC EDGAR filer lookup and filing traversal
//!
//! # Example
//!
//! ```rust,ignore
//! use edgr::{Edgr, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> edgr::Result<()> {
//!     let client = Edgr::new().with_sec("MyApp/1.0 (contact@example.com)");
//!
//!     let filings = client
//!         .list_filings_for_symbol(&Symbol::new("AAPL"), "10-K", "2020-01-01")
//!         .await?;
//!     println!("{} annual reports", filings.len());
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use edgr_core::*;

// Providers
#[cfg(feature = "iex")]
pub use edgr_iex::IexProvider;
#[cfg(feature = "sec")]
pub use edgr_sec::{
    Decision, FilingQuery, FilingTraversal, HttpPageFetcher, IndexPageBuilder,
    RegexLinkExtractor, SecProvider, SkipReason, SkippedEntry, TraversalReport, parse_index_page,
};

mod registry;
pub use registry::Edgr;

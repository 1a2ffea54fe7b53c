#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/piquette/edgr/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for edgr.
//!
//! This crate provides the foundational abstractions shared by the providers:
//!
//! - [`Provider`](provider::Provider) - Base trait for all providers
//! - [`CompanyDirectory`](provider::CompanyDirectory) - Listed companies
//! - [`FilerResolver`](provider::FilerResolver) - Ticker to filer resolution
//! - [`FilingSource`](provider::FilingSource) - Filing discovery
//! - [`PageFetcher`](provider::PageFetcher), [`LinkExtractor`](provider::LinkExtractor)
//!   and [`FilingBuilder`](provider::FilingBuilder) - Traversal collaborators

/// Error types for edgr operations.
pub mod error;
/// Provider and collaborator traits.
pub mod provider;
/// Core data types (Company, Filer, Filing, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{Error, Result};
pub use provider::{
    CompanyDirectory, FilerResolver, FilingBuilder, FilingSource, Headers, LinkExtractor,
    PageFetcher, Provider, QueryParams,
};
pub use types::{Company, Document, Filer, Filing, SecFiling, Symbol};

//! Filing discovery over one filer's archive directory.
//!
//! The walk is a best-effort scrape: only the stop date and the filer's
//! top-level directory page are preconditions. Every entry below that is
//! visited once and yields one step:
//!
//! - `Accept` - keep the filing and move on
//! - `Skip` - the entry failed or was filtered out; move on
//! - `Stop` - the cutoff was crossed; nothing later can qualify

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use edgr_core::{Error, Filing, FilingBuilder, LinkExtractor, PageFetcher, Result, SecFiling};
use regex::Regex;
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use tracing::{debug, instrument, warn};

use crate::links::resolve_link;
use crate::{ARCHIVE_PATH, PAGE_ATTEMPTS, SEC_BASE_URL};

/// Format of the stop date.
const STOP_DATE_FORMAT: &str = "%Y-%m-%d";

/// Zero-padded `YYYY-MM-DD`.
static STOP_DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("stop date pattern is valid"));

/// What to look for in a filer's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingQuery {
    /// Filer identifier (CIK) whose directory is walked.
    pub filer_id: String,
    /// Keep only filings of this form type.
    pub form_type: Option<String>,
    /// Stop at the first filing accepted before this date.
    pub stop_date: Option<NaiveDate>,
    /// Ticker stamped on every returned filing; defaults to the filing's own symbol.
    pub symbol: Option<String>,
}

impl FilingQuery {
    /// Query every filing of `filer_id`.
    #[must_use]
    pub fn new(filer_id: impl Into<String>) -> Self {
        Self {
            filer_id: filer_id.into(),
            form_type: None,
            stop_date: None,
            symbol: None,
        }
    }

    /// Build a query from loosely typed arguments.
    ///
    /// Empty `form_type` or `stop_date` mean "no filter". A non-empty stop date
    /// must be `YYYY-MM-DD`.
    pub fn parse(filer_id: &str, form_type: &str, stop_date: &str) -> Result<Self> {
        let mut query = Self::new(filer_id);
        if !form_type.is_empty() {
            query = query.with_form_type(form_type);
        }
        if !stop_date.is_empty() {
            if !STOP_DATE_SHAPE.is_match(stop_date) {
                return Err(Error::InvalidParameter(format!(
                    "stop date {stop_date:?} is not YYYY-MM-DD"
                )));
            }
            let date = NaiveDate::parse_from_str(stop_date, STOP_DATE_FORMAT).map_err(|e| {
                Error::InvalidParameter(format!(
                    "stop date {stop_date:?} is not YYYY-MM-DD: {e}"
                ))
            })?;
            query = query.with_stop_date(date);
        }
        Ok(query)
    }

    /// Keep only filings of `form_type`.
    #[must_use]
    pub fn with_form_type(mut self, form_type: impl Into<String>) -> Self {
        self.form_type = Some(form_type.into());
        self
    }

    /// Stop at the first filing accepted before `date`.
    #[must_use]
    pub const fn with_stop_date(mut self, date: NaiveDate) -> Self {
        self.stop_date = Some(date);
        self
    }

    /// Stamp `symbol` on every returned filing.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// The cutoff instant: midnight at the start of the stop date.
    #[must_use]
    pub fn cutoff(&self) -> Option<NaiveDateTime> {
        self.stop_date.map(|d| d.and_time(NaiveTime::default()))
    }
}

/// Filter outcome for a successfully built filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep the filing.
    Accept,
    /// Form type does not match the filter.
    SkipFormType,
    /// Accepted strictly before the cutoff; stop the walk.
    StopAtCutoff,
}

impl Decision {
    /// Apply the form-type filter, then the cutoff.
    ///
    /// Directory entries run newest first, so the first filing older than the
    /// cutoff ends the walk. Filings skipped by form type never stop it.
    #[must_use]
    pub fn for_filing(
        filing: &Filing,
        form_type: Option<&str>,
        cutoff: Option<NaiveDateTime>,
    ) -> Self {
        if form_type.is_some_and(|f| !f.is_empty() && filing.form_type != f) {
            return Self::SkipFormType;
        }
        match cutoff {
            Some(cutoff) if filing.edgar_time < cutoff => Self::StopAtCutoff,
            _ => Self::Accept,
        }
    }
}

/// Why a directory entry produced no filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// The sub-directory listing could not be fetched.
    ListingUnavailable(String),
    /// The listing had no index-page link.
    IndexLinkMissing,
    /// The index page could not be turned into a filing.
    BuildFailed(String),
}

/// A directory entry that was skipped because of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Sub-directory URL of the entry.
    pub url: String,
    /// What went wrong.
    pub reason: SkipReason,
}

/// Result of a walk: the filings plus diagnostics for every failed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraversalReport {
    /// Accepted filings in directory order.
    pub filings: Vec<SecFiling>,
    /// Entries dropped because a fetch, extraction or build failed.
    pub skipped: Vec<SkippedEntry>,
    /// Whether the walk ended at the cutoff rather than the end of the directory.
    pub stopped_at_cutoff: bool,
}

/// Outcome of visiting a single directory entry.
#[derive(Debug)]
enum Step {
    Accept(Box<SecFiling>),
    Skip(Option<SkipReason>),
    Stop,
}

/// Walks a filer's archive directory and assembles its filings.
#[derive(Debug, Clone)]
pub struct FilingTraversal {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn LinkExtractor>,
    builder: Arc<dyn FilingBuilder>,
    archive_host: String,
}

impl FilingTraversal {
    /// Create a traversal over the public archive.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn LinkExtractor>,
        builder: Arc<dyn FilingBuilder>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            builder,
            archive_host: SEC_BASE_URL.to_string(),
        }
    }

    /// Walk a different archive host (scheme and authority, no trailing slash).
    #[must_use]
    pub fn with_archive_host(mut self, host: impl Into<String>) -> Self {
        self.archive_host = host.into();
        self
    }

    /// URL of a filer's top-level directory page.
    #[must_use]
    pub fn directory_url(&self, filer_id: &str) -> String {
        format!("{}{ARCHIVE_PATH}{filer_id}", self.archive_host)
    }

    /// Walk the directory and collect filings matching `query`.
    ///
    /// Fails only when the top-level directory page cannot be fetched; failures
    /// on individual entries end up in [`TraversalReport::skipped`].
    #[instrument(skip(self, query), fields(filer_id = %query.filer_id))]
    pub async fn run(&self, query: &FilingQuery) -> Result<TraversalReport> {
        let directory_url = self.directory_url(&query.filer_id);
        let directory = self
            .fetcher
            .fetch_page(&directory_url, PAGE_ATTEMPTS)
            .await?;

        let links = self.extractor.extract_directory_links(&directory);
        if links.is_empty() && !directory.trim().is_empty() {
            warn!(
                url = %directory_url,
                "directory page has no filing links; listing markup may have changed"
            );
        }
        debug!("found {} directory entries", links.len());

        let cutoff = query.cutoff();
        let mut report = TraversalReport::default();
        let directory_base = format!("{directory_url}/");

        for href in links {
            let url = resolve_link(&directory_base, &href);
            match self.visit(&url, query, cutoff).await {
                Step::Accept(filing) => {
                    debug!(
                        accession = %filing.filing.accession_number,
                        form_type = %filing.filing.form_type,
                        edgar_time = %filing.filing.edgar_time,
                        "accepted filing"
                    );
                    report.filings.push(*filing);
                }
                Step::Skip(Some(reason)) => {
                    warn!(url = %url, reason = ?reason, "skipping directory entry");
                    report.skipped.push(SkippedEntry { url, reason });
                }
                Step::Skip(None) => {}
                Step::Stop => {
                    debug!(url = %url, "filing predates stop date, ending traversal");
                    report.stopped_at_cutoff = true;
                    break;
                }
            }
        }

        Ok(report)
    }

    /// Fetch, extract, build and filter a single directory entry.
    async fn visit(
        &self,
        url: &str,
        query: &FilingQuery,
        cutoff: Option<NaiveDateTime>,
    ) -> Step {
        let listing = match self.fetcher.fetch_page(url, PAGE_ATTEMPTS).await {
            Ok(page) => page,
            Err(e) => return Step::Skip(Some(SkipReason::ListingUnavailable(e.to_string()))),
        };

        let Some(index_href) = self.extractor.extract_index_link(&listing) else {
            return Step::Skip(Some(SkipReason::IndexLinkMissing));
        };
        let index_url = resolve_link(url, &index_href);

        let mut sec_filing = match self
            .builder
            .build_filing(&query.filer_id, &index_url)
            .await
        {
            Ok(filing) => filing,
            Err(e) => return Step::Skip(Some(SkipReason::BuildFailed(e.to_string()))),
        };

        match Decision::for_filing(&sec_filing.filing, query.form_type.as_deref(), cutoff) {
            Decision::SkipFormType => Step::Skip(None),
            Decision::StopAtCutoff => Step::Stop,
            Decision::Accept => {
                let filing = &mut sec_filing.filing;
                if let Some(symbol) = &query.symbol {
                    filing.symbol.clone_from(symbol);
                }
                filing.all_symbols = vec![filing.symbol.clone()];
                Step::Accept(Box::new(sec_filing))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filing(form_type: &str, y: i32, m: u32, d: u32) -> Filing {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Filing::new(
            "320193",
            "0000320193-23-000001",
            form_type,
            date.and_hms_opt(16, 30, 0).unwrap(),
            date,
        )
    }

    #[test]
    fn test_query_parse_empty_means_unfiltered() {
        let query = FilingQuery::parse("320193", "", "").unwrap();
        assert_eq!(query, FilingQuery::new("320193"));
        assert_eq!(query.cutoff(), None);
    }

    #[test]
    fn test_query_parse_stop_date() {
        let query = FilingQuery::parse("320193", "10-K", "2023-02-01").unwrap();
        assert_eq!(query.form_type.as_deref(), Some("10-K"));
        assert_eq!(
            query.cutoff(),
            NaiveDate::from_ymd_opt(2023, 2, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
    }

    #[test]
    fn test_query_parse_rejects_bad_dates() {
        for bad in [
            "2023/02/01",
            "02-01-2023",
            "2023-13-01",
            "yesterday",
            "2023-2-1",
            "2023-02-1",
            "2023-02-01 ",
        ] {
            let err = FilingQuery::parse("320193", "", bad).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)), "{bad}: {err:?}");
        }
    }

    #[test]
    fn test_decision_without_filters_accepts() {
        assert_eq!(
            Decision::for_filing(&filing("8-K", 2001, 1, 1), None, None),
            Decision::Accept
        );
        assert_eq!(
            Decision::for_filing(&filing("8-K", 2001, 1, 1), Some(""), None),
            Decision::Accept
        );
    }

    #[test]
    fn test_decision_form_type_is_exact() {
        let f = filing("10-K/A", 2023, 3, 1);
        assert_eq!(
            Decision::for_filing(&f, Some("10-K"), None),
            Decision::SkipFormType
        );
        assert_eq!(
            Decision::for_filing(&f, Some("10-K/A"), None),
            Decision::Accept
        );
    }

    #[test]
    fn test_decision_cutoff_is_strict() {
        let cutoff = NaiveDate::from_ymd_opt(2023, 2, 1).and_then(|d| d.and_hms_opt(0, 0, 0));

        assert_eq!(
            Decision::for_filing(&filing("10-Q", 2023, 2, 1), None, cutoff),
            Decision::Accept
        );
        assert_eq!(
            Decision::for_filing(&filing("10-Q", 2023, 1, 31), None, cutoff),
            Decision::StopAtCutoff
        );
    }

    #[test]
    fn test_decision_form_filter_wins_over_cutoff() {
        let cutoff = NaiveDate::from_ymd_opt(2023, 2, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        assert_eq!(
            Decision::for_filing(&filing("8-K", 2020, 1, 1), Some("10-K"), cutoff),
            Decision::SkipFormType
        );
    }
}

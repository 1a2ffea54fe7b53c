//! Filing construction from a filing's index page.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use edgr_core::{Document, Error, Filing, FilingBuilder, PageFetcher, Result, SecFiling};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::PAGE_ATTEMPTS;
use crate::links::resolve_link;

static FORM_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div id="formName">\s*<strong>\s*Form\s+([^<]+?)\s*</strong>"#)
        .expect("form name pattern is valid")
});

static ACCESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div id="secNum">.*?(\d{10}-\d{2}-\d{6})"#)
        .expect("accession pattern is valid")
});

static INFO_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="infoHead">\s*(.*?)\s*</div>\s*<div class="info">\s*(.*?)\s*</div>"#)
        .expect("info pair pattern is valid")
});

static FILE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<table class="tableFile"[^>]*>(.*?)</table>"#)
        .expect("file table pattern is valid")
});

static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").expect("row pattern is valid"));

static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<td[^>]*>(.*?)</td>").expect("cell pattern is valid"));

static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="([^"]+)""#).expect("href pattern is valid"));

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// Filename suffix of an index page; the accession number precedes it.
const INDEX_SUFFIX: &str = "-index.html";

/// [`FilingBuilder`] that fetches and scrapes a filing's index page.
#[derive(Debug, Clone)]
pub struct IndexPageBuilder {
    fetcher: Arc<dyn PageFetcher>,
}

impl IndexPageBuilder {
    /// Create a builder that fetches index pages through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl FilingBuilder for IndexPageBuilder {
    async fn build_filing(&self, filer_id: &str, index_url: &str) -> Result<SecFiling> {
        let page = self.fetcher.fetch_page(index_url, PAGE_ATTEMPTS).await?;
        parse_index_page(filer_id, index_url, &page)
    }
}

/// Scrape an index page into a filing and its documents.
///
/// Form type and filing date are required. The acceptance time falls back to
/// midnight of the filing date when the page does not list one.
pub fn parse_index_page(filer_id: &str, index_url: &str, page: &str) -> Result<SecFiling> {
    let form_type = FORM_NAME
        .captures(page)
        .map(|c| cell_text(&c[1]))
        .filter(|f| !f.is_empty())
        .ok_or_else(|| Error::Parse(format!("no form type on index page {index_url}")))?;

    let info: HashMap<String, String> = INFO_PAIR
        .captures_iter(page)
        .map(|c| (cell_text(&c[1]), cell_text(&c[2])))
        .collect();

    let filed_date = info
        .get("Filing Date")
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .ok_or_else(|| Error::Parse(format!("no filing date on index page {index_url}")))?;

    let edgar_time = info
        .get("Accepted")
        .and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S").ok())
        .unwrap_or_else(|| filed_date.and_time(NaiveTime::default()));

    let accession_number = ACCESSION
        .captures(page)
        .map(|c| c[1].to_string())
        .or_else(|| accession_from_url(index_url))
        .unwrap_or_default();

    let mut filing = Filing::new(filer_id, accession_number, form_type, edgar_time, filed_date);
    if let Some(period) = info
        .get("Period of Report")
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    {
        filing = filing.with_period_of_report(period);
    }

    let docs = parse_documents(index_url, page);
    debug!(
        form_type = %filing.form_type,
        accession = %filing.accession_number,
        "parsed index page with {} documents",
        docs.len()
    );

    Ok(SecFiling::new(filing, docs))
}

/// Every row of the page's document tables, in page order.
fn parse_documents(index_url: &str, page: &str) -> Vec<Document> {
    FILE_TABLE
        .captures_iter(page)
        .flat_map(|table| {
            ROW.captures_iter(table.get(1).map_or("", |m| m.as_str()))
                .filter_map(|row| parse_document_row(index_url, &row[1]))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Rows are `Seq | Description | Document | Type | Size`; header rows have no `<td>`.
fn parse_document_row(index_url: &str, row: &str) -> Option<Document> {
    let cells: Vec<&str> = CELL
        .captures_iter(row)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    if cells.len() < 5 {
        return None;
    }

    let href = HREF.captures(cells[2]).map(|c| c[1].to_string())?;

    Some(Document {
        sequence: cell_text(cells[0]).parse().ok(),
        description: cell_text(cells[1]),
        name: cell_text(cells[2])
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string(),
        url: resolve_link(index_url, &href),
        doc_type: cell_text(cells[3]),
        size: cell_text(cells[4]).parse().ok(),
    })
}

fn accession_from_url(index_url: &str) -> Option<String> {
    index_url
        .rsplit('/')
        .next()
        .and_then(|file| file.strip_suffix(INDEX_SUFFIX))
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

/// Visible text of an HTML fragment.
fn cell_text(html: &str) -> String {
    TAG.replace_all(html, " ")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

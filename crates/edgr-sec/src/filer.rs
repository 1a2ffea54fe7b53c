//! Company lookup feed decoding.
//!
//! The lookup feed is served in whatever charset the archive picks (often
//! ISO-8859-1), so bodies are transcoded to UTF-8 before the XML is decoded.

use edgr_core::{Error, Filer, Result, Symbol};
use encoding_rs::{Encoding, UTF_8};
use regex::bytes::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// `encoding="..."` inside a leading XML declaration.
static XML_DECLARED_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?-u:\xEF\xBB\xBF)?<\?xml[^>]*?encoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
        .expect("xml declaration pattern is valid")
});

/// Atom feed returned by the company lookup.
#[derive(Debug, Default, Deserialize)]
struct CompanyFeed {
    #[serde(rename = "company-info", default)]
    info: CompanyInfo,
}

#[derive(Debug, Default, Deserialize)]
struct CompanyInfo {
    #[serde(default)]
    cik: String,
    #[serde(rename = "assigned-sic", default)]
    sic: String,
    #[serde(rename = "assigned-sic-desc", default)]
    sic_description: String,
    #[serde(rename = "conformed-name", default)]
    name: String,
}

/// Transcode a response body to UTF-8.
///
/// The charset comes from the `Content-Type` header, then the XML declaration,
/// then UTF-8. A byte-order mark overrides all three.
pub(crate) fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let encoding = content_type
        .and_then(charset_from_content_type)
        .or_else(|| xml_declared_encoding(bytes))
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(
            "malformed {} sequences replaced in response body",
            used.name()
        );
    }
    text.into_owned()
}

fn charset_from_content_type(content_type: &str) -> Option<&'static Encoding> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, value)| Encoding::for_label(value.trim().trim_matches('"').as_bytes()))
}

fn xml_declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(256)];
    XML_DECLARED_ENCODING
        .captures(head)
        .and_then(|c| Encoding::for_label(&c[1]))
}

/// Decode a lookup feed and validate it into a [`Filer`].
pub(crate) fn parse_filer(symbol: &Symbol, body: &str) -> Result<Filer> {
    let feed: CompanyFeed = quick_xml::de::from_str(body)
        .map_err(|e| Error::Parse(format!("failed to decode company feed for {symbol}: {e}")))?;
    let info = feed.info;

    let cik = info.cik.trim();
    if cik.is_empty() {
        return Err(Error::MissingCik {
            symbol: symbol.to_string(),
        });
    }

    let name = info.name.trim();
    if name.is_empty() {
        return Err(Error::MissingName {
            symbol: symbol.to_string(),
        });
    }

    Ok(Filer {
        cik: cik.to_string(),
        symbol: symbol.clone(),
        sic: info.sic.trim().to_string(),
        sic_description: info.sic_description.trim().to_string(),
        name: name.to_string(),
    })
}

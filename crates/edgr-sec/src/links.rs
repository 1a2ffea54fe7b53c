//! Link extraction from archive listing pages.

use edgr_core::LinkExtractor;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Sub-directory anchors on a filer's directory page: a table cell whose link wraps a folder icon.
static DIRECTORY_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<td><a href="([^"]*)"><img"#).expect("directory link pattern is valid")
});

/// Index-page anchor on a sub-directory listing, next to the same icon markup.
static INDEX_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href="([^"]*index\.html)"><img"#).expect("index link pattern is valid")
});

/// [`LinkExtractor`] matching the archive's fixed listing markup with regular expressions.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexLinkExtractor;

impl LinkExtractor for RegexLinkExtractor {
    fn extract_directory_links(&self, page: &str) -> Vec<String> {
        DIRECTORY_LINK
            .captures_iter(page)
            .map(|c| c[1].to_string())
            .collect()
    }

    fn extract_index_link(&self, page: &str) -> Option<String> {
        INDEX_LINK.captures(page).map(|c| c[1].to_string())
    }
}

/// Resolve `href` against the page it was found on.
///
/// Listing pages use host-relative links; anything that fails to parse is
/// returned unchanged and left for the fetch to reject.
pub(crate) fn resolve_link(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}

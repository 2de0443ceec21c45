// src/fetch/urls.rs

use url::Url;

use crate::error::ScrapeError;

/// Build the ordered list of page URLs: `base + suffix` for every page
/// identifier, by plain concatenation. No identifiers means just the base URL.
pub fn page_urls<S: AsRef<str>>(base: &str, pages: &[S]) -> Result<Vec<Url>, ScrapeError> {
    let parse = |raw: String| {
        Url::parse(&raw).map_err(|source| ScrapeError::InvalidUrl { url: raw, source })
    };

    if pages.is_empty() {
        return Ok(vec![parse(base.to_string())?]);
    }

    pages
        .iter()
        .map(|page| parse(format!("{}{}", base, page.as_ref())))
        .collect()
}

// src/error.rs

use thiserror::Error;

/// Everything that can go wrong while turning one page into rows.
///
/// Every variant is scoped to a single page: the pipeline records it and moves
/// on to the next page instead of aborting the run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Connection refused, DNS failure, timeout, or a body that could not be read.
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a 4xx/5xx status.
    #[error("HTTP error {code} from {url}")]
    HttpStatus { url: String, code: u16 },

    /// The document contains no `<table>` element.
    #[error("statistics table not found")]
    NoTableFound,

    /// The page parsed fine but its header differs from the one already fixed
    /// by an earlier page.
    #[error("header mismatch: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// A base URL + page identifier did not form a valid absolute URL.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ScrapeError {
    /// Short machine-friendly label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Network { .. } => "network",
            ScrapeError::HttpStatus { .. } => "http_status",
            ScrapeError::NoTableFound => "no_table",
            ScrapeError::HeaderMismatch { .. } => "header_mismatch",
            ScrapeError::InvalidUrl { .. } => "invalid_url",
        }
    }
}

// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::ScrapeError;

pub mod urls;

pub use urls::page_urls;

/// Anything that can turn a URL into a document body.
///
/// The pipeline only talks to this trait, so tests can feed it canned pages.
pub trait PageSource {
    fn fetch(&self, url: &Url) -> Result<String, ScrapeError>;
}

impl<S: PageSource> PageSource for &S {
    fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP fetcher: one request at a time, bounded by a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .gzip(true)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpFetcher {
    #[instrument(level = "debug", skip(self, url), fields(url = %url))]
    fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| ScrapeError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|source| ScrapeError::Network {
            url: url.to_string(),
            source,
        })?;
        debug!(status = status.as_u16(), bytes = body.len(), "fetched");
        Ok(body)
    }
}

// src/pipeline.rs

use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{info, instrument, warn};
use url::Url;

use crate::{
    extract::extract_table,
    fetch::PageSource,
    normalize::{normalize, NumericColumns, RecordSet},
    table::{Merged, PageResult, Table},
};

/// What happened to one page, for the caller's summary.
#[derive(Debug, Clone)]
pub struct PageReport {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    /// Rows merged from the page, or the error that kept it out of the table.
    pub result: Result<usize, String>,
}

#[derive(Debug)]
pub enum Outcome {
    Data {
        table: Table,
        records: RecordSet,
        reports: Vec<PageReport>,
        malformed_rows: usize,
    },
    /// Every page failed or no rows were found. Whether that is fatal is up
    /// to the caller.
    Empty { reports: Vec<PageReport> },
}

impl Outcome {
    pub fn reports(&self) -> &[PageReport] {
        match self {
            Outcome::Data { reports, .. } | Outcome::Empty { reports } => reports,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty { .. })
    }
}

/// Fetch → extract → merge → normalize, one page at a time.
pub struct Pipeline<S> {
    source: S,
    numeric: NumericColumns,
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(source: S, numeric: NumericColumns) -> Self {
        Self { source, numeric }
    }

    /// Fetch and extract a single page. Never panics; every failure ends up in the result.
    pub fn scrape_page(&self, url: &Url) -> PageResult {
        let outcome = self
            .source
            .fetch(url)
            .and_then(|body| extract_table(&body));
        PageResult::new(url.as_str(), outcome)
    }

    /// Scrape every URL in order, folding each page into the merge as soon as
    /// it arrives. A page's report reflects what the merge did with it, so a
    /// page rejected for its header is reported as failed.
    #[instrument(level = "info", skip(self, urls), fields(pages = urls.len()))]
    pub fn run(&self, urls: &[Url]) -> Outcome {
        let mut reports = Vec::with_capacity(urls.len());
        let mut merged = Merged::default();

        for url in urls {
            let start = Instant::now();
            let fetched_at = Utc::now();
            let page = self.scrape_page(url);

            let failures_before = merged.failures().len();
            let rows_before = merged.row_count();
            merged.push_page(page);
            let result = match merged.failures().get(failures_before) {
                Some(failure) => Err(failure.error.to_string()),
                None => {
                    let rows = merged.row_count() - rows_before;
                    info!(url = %url, rows, elapsed = ?start.elapsed(), "page scraped");
                    Ok(rows)
                }
            };
            reports.push(PageReport {
                url: url.to_string(),
                fetched_at,
                result,
            });
        }

        let malformed_rows = merged.malformed_rows();
        if malformed_rows > 0 {
            warn!(malformed_rows, "rows with the wrong cell count were dropped");
        }

        match merged.into_table() {
            Some(table) => {
                info!(rows = table.len(), columns = ?table.columns(), "extracted columns");
                let records = normalize(&table, &self.numeric);
                Outcome::Data {
                    table,
                    records,
                    reports,
                    malformed_rows,
                }
            }
            None => {
                warn!("no rows merged from any page");
                Outcome::Empty { reports }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::normalize::Value;
    use std::{cell::RefCell, collections::HashMap};

    /// Canned pages keyed by URL; records the order in which pages were asked for.
    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<String, Result<String, u16>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(body.to_string()));
            self
        }

        fn status(mut self, url: &str, code: u16) -> Self {
            self.pages.insert(url.to_string(), Err(code));
            self
        }
    }

    impl PageSource for FakeSource {
        fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
            self.calls.borrow_mut().push(url.to_string());
            match self.pages.get(url.as_str()) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(code)) => Err(ScrapeError::HttpStatus {
                    url: url.to_string(),
                    code: *code,
                }),
                None => Err(ScrapeError::NoTableFound),
            }
        }
    }

    fn html(rows: &[(&str, &str, &str)]) -> String {
        let mut s = String::from(
            "<table><tr><th>Rank</th><th>Name</th><th>Saves</th><th>Pct.</th></tr>",
        );
        for (i, (name, saves, pct)) in rows.iter().enumerate() {
            s.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                i + 1,
                name,
                saves,
                pct
            ));
        }
        s.push_str("</table>");
        s
    }

    fn urls() -> Vec<Url> {
        crate::fetch::page_urls("http://stats.test/421/", &["p1", "p2", "p3"]).unwrap()
    }

    #[test]
    fn test_two_good_pages_one_failed() {
        let source = FakeSource::default()
            .page("http://stats.test/421/p1", &html(&[("A", "10", "80%"), ("B", "9", "75.5%")]))
            .page("http://stats.test/421/p2", &html(&[("C", "8", "N/A")]))
            .status("http://stats.test/421/p3", 500);
        let pipeline = Pipeline::new(&source, NumericColumns::default());

        let outcome = pipeline.run(&urls());
        let Outcome::Data { table, records, reports, .. } = outcome else {
            panic!("expected data");
        };
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns(), ["Rank", "Name", "Saves", "Pct."]);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].result, Ok(2));
        assert!(reports[2].result.as_ref().unwrap_err().contains("500"));

        let pct = records.column("Pct.").unwrap();
        assert_eq!(pct.values, vec![Value::Float(80.0), Value::Float(75.5), Value::Missing]);
    }

    #[test]
    fn test_pages_are_fetched_in_order() {
        let source = FakeSource::default()
            .page("http://stats.test/421/p1", &html(&[("A", "1", "1%")]))
            .page("http://stats.test/421/p3", &html(&[("B", "2", "2%")]));
        let pipeline = Pipeline::new(&source, NumericColumns::default());
        let _ = pipeline.run(&urls());
        assert_eq!(
            *source.calls.borrow(),
            vec![
                "http://stats.test/421/p1",
                "http://stats.test/421/p2",
                "http://stats.test/421/p3"
            ]
        );
    }

    #[test]
    fn test_every_page_failing_is_empty() {
        let source = FakeSource::default()
            .status("http://stats.test/421/p1", 404)
            .page("http://stats.test/421/p2", "<p>no table here</p>");
        let pipeline = Pipeline::new(&source, NumericColumns::default());
        let outcome = pipeline.run(&urls());
        assert!(outcome.is_empty());
        assert_eq!(outcome.reports().len(), 3);
        assert!(outcome.reports().iter().all(|r| r.result.is_err()));
    }

    #[test]
    fn test_scrape_page_reports_no_table() {
        let source = FakeSource::default().page("http://stats.test/421/p1", "<div></div>");
        let pipeline = Pipeline::new(&source, NumericColumns::default());
        let page = pipeline.scrape_page(&urls()[0]);
        assert!(matches!(page.outcome, Err(ScrapeError::NoTableFound)));
    }

    #[test]
    fn test_page_with_other_header_is_reported_failed() {
        let other = "<table><tr><th>Player</th><th>GA</th></tr>\
                     <tr><td>X</td><td>3</td></tr><tr><td>Y</td><td>4</td></tr></table>";
        let source = FakeSource::default()
            .page("http://stats.test/421/p1", &html(&[("A", "10", "80%")]))
            .page("http://stats.test/421/p2", other)
            .page("http://stats.test/421/p3", &html(&[("B", "9", "70%")]));
        let pipeline = Pipeline::new(&source, NumericColumns::default());

        let Outcome::Data { table, reports, .. } = pipeline.run(&urls()) else {
            panic!("expected data");
        };
        assert_eq!(table.len(), 2);
        assert_eq!(reports[0].result, Ok(1));
        assert!(reports[1].result.as_ref().unwrap_err().contains("header"));
        assert_eq!(reports[2].result, Ok(1));
    }

    #[test]
    fn test_report_counts_merged_rows_not_extracted() {
        let ragged = "<table><tr><th>Rank</th><th>Name</th><th>Saves</th><th>Pct.</th></tr>\
                      <tr><td>1</td><td>A</td><td>10</td><td>80%</td></tr>\
                      <tr><td>2</td><td>B</td></tr></table>";
        let source = FakeSource::default().page("http://stats.test/421/p1", ragged);
        let pipeline = Pipeline::new(&source, NumericColumns::default());

        let Outcome::Data { reports, malformed_rows, .. } = pipeline.run(&urls()[..1]) else {
            panic!("expected data");
        };
        assert_eq!(reports[0].result, Ok(1));
        assert_eq!(malformed_rows, 1);
    }
}

// src/extract.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use crate::error::ScrapeError;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("selector should parse"));
static TH: Lazy<Selector> = Lazy::new(|| Selector::parse("th").expect("selector should parse"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("selector should parse"));
static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("selector should parse"));

/// One page's table, exactly as it appeared in the HTML.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    /// Trimmed text of every `<th>` in the table, in document order.
    pub headers: Vec<String>,
    /// Trimmed `<td>` texts of every `<tr>` after the first one.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Pull headers and data rows out of the first `<table>` in `document`.
///
/// The first `<tr>` is taken to be the header row and skipped, whether or not
/// it holds `<td>`s. Rows are returned as-is; width checks happen at merge time.
#[instrument(level = "debug", skip(document), fields(len = document.len()))]
pub fn extract_table(document: &str) -> Result<RawTable, ScrapeError> {
    let doc = Html::parse_document(document);
    let table = doc.select(&TABLE).next().ok_or(ScrapeError::NoTableFound)?;

    let headers: Vec<String> = table.select(&TH).map(cell_text).collect();
    let rows: Vec<Vec<String>> = table
        .select(&TR)
        .skip(1)
        .map(|tr| tr.select(&TD).map(cell_text).collect())
        .collect();

    debug!(headers = headers.len(), rows = rows.len(), "extracted table");
    Ok(RawTable { headers, rows })
}

// src/table.rs

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ScrapeError;
use crate::extract::RawTable;

static WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex should compile"));

/// Collapse runs of whitespace so `"Save\n   Pct"` and `"Save Pct"` compare equal.
pub fn canonical_name(name: &str) -> String {
    WS.replace_all(name.trim(), " ").into_owned()
}

/// Column names of the merged table, fixed by the first page that had a header.
/// Names may repeat; lookups resolve to the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of the first column whose name matches, ignoring whitespace differences.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let wanted = canonical_name(name);
        self.columns.iter().position(|c| canonical_name(c) == wanted)
    }

    /// First of `candidates` that exists in the schema.
    pub fn find_any<S: AsRef<str>>(&self, candidates: &[S]) -> Option<usize> {
        candidates.iter().find_map(|c| self.index_of(c.as_ref()))
    }
}

/// Header plus rows, every row exactly `schema.width()` cells wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    schema: Schema,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, dropping rows whose width does not match the header.
    /// Returns the table and the number of rows dropped.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<String>>) -> (Self, usize) {
        let schema = Schema::new(columns);
        let before = rows.len();
        let rows: Vec<Vec<String>> = rows.into_iter().filter(|r| r.len() == schema.width()).collect();
        let dropped = before - rows.len();
        (Self { schema, rows }, dropped)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All cells of the first column named `name`, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &str>> {
        let idx = self.schema.index_of(name)?;
        Some(self.rows.iter().map(move |r| r[idx].as_str()))
    }
}

/// Extraction outcome for one page, tagged with where it came from.
#[derive(Debug)]
pub struct PageResult {
    pub url: String,
    pub outcome: Result<RawTable, ScrapeError>,
}

impl PageResult {
    pub fn new(url: impl Into<String>, outcome: Result<RawTable, ScrapeError>) -> Self {
        Self {
            url: url.into(),
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct PageFailure {
    pub url: String,
    pub error: ScrapeError,
}

/// Running merge state. Pages are folded in with [`Merged::push`]; more pages
/// can be pushed after any point, so merging `[A, B]` and then pushing `C`
/// equals merging `[A, B, C]`.
#[derive(Debug, Default)]
pub struct Merged {
    schema: Option<Schema>,
    rows: Vec<Vec<String>>,
    failures: Vec<PageFailure>,
    pages_merged: usize,
    malformed_rows: usize,
}

impl Merged {
    pub fn push(mut self, page: PageResult) -> Self {
        self.push_page(page);
        self
    }

    pub fn push_page(&mut self, page: PageResult) {
        let PageResult { url, outcome } = page;
        let raw = match outcome {
            Ok(raw) => raw,
            Err(error) => {
                warn!(url = %url, kind = error.kind(), error = %error, "page contributes no rows");
                self.failures.push(PageFailure { url, error });
                return;
            }
        };

        if raw.headers.is_empty() {
            warn!(url = %url, rows = raw.rows.len(), "page has no header cells; skipping");
            return;
        }

        let schema = self.schema.get_or_insert_with(|| {
            debug!(url = %url, columns = ?raw.headers, "schema fixed");
            Schema::new(raw.headers.clone())
        });
        if schema.columns() != raw.headers.as_slice() {
            let error = ScrapeError::HeaderMismatch {
                expected: schema.columns().to_vec(),
                found: raw.headers,
            };
            warn!(url = %url, error = %error, "page header differs; skipping");
            self.failures.push(PageFailure { url, error });
            return;
        }

        let width = schema.width();
        let mut kept = 0usize;
        for row in raw.rows {
            if row.len() == width {
                self.rows.push(row);
                kept += 1;
            } else {
                debug!(url = %url, expected = width, found = row.len(), "dropping malformed row");
                self.malformed_rows += 1;
            }
        }
        self.pages_merged += 1;
        debug!(url = %url, rows = kept, total = self.rows.len(), "page merged");
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn failures(&self) -> &[PageFailure] {
        &self.failures
    }

    pub fn pages_merged(&self) -> usize {
        self.pages_merged
    }

    pub fn malformed_rows(&self) -> usize {
        self.malformed_rows
    }

    /// The merged table, or `None` when nothing was merged (the empty result).
    pub fn into_table(self) -> Option<Table> {
        match self.schema {
            Some(schema) if !self.rows.is_empty() => Some(Table {
                schema,
                rows: self.rows,
            }),
            _ => None,
        }
    }
}

/// Fold page results, in order, into one table.
pub fn merge_pages<I>(pages: I) -> Merged
where
    I: IntoIterator<Item = PageResult>,
{
    pages.into_iter().fold(Merged::default(), Merged::push)
}

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod table;

pub use config::Config;
pub use error::ScrapeError;
pub use extract::{extract_table, RawTable};
pub use fetch::{page_urls, HttpFetcher, PageSource};
pub use normalize::{normalize, NumericColumns, RecordSet, Value};
pub use pipeline::{Outcome, PageReport, Pipeline};
pub use table::{merge_pages, Merged, PageResult, Table};

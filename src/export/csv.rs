// src/export/csv.rs

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::table::Table;

/// Write the merged table as CSV: header row first, then one line per record.
pub fn write_table<P: AsRef<Path>>(path: P, table: &Table) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }

    let mut wtr = ::csv::Writer::from_path(path).with_context(|| format!("creating {:?}", path))?;
    wtr.write_record(table.columns())
        .context("writing CSV header")?;
    for (idx, row) in table.rows().iter().enumerate() {
        wtr.write_record(row)
            .with_context(|| format!("writing CSV row {}", idx))?;
    }
    wtr.flush().with_context(|| format!("flushing {:?}", path))?;

    info!(path = %path.display(), rows = table.len(), "data saved");
    Ok(())
}

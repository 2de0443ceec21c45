use anyhow::{Context, Result};
use keeperstats::{export, render, NumericColumns};
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::{env, fs::File, path::Path, process::exit};

fn main() {
    // Expect exactly one CLI argument: path to an exported Parquet file.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <PARQUET_FILE>", args[0]);
        exit(1);
    }
    if let Err(e) = inspect(Path::new(&args[1])) {
        eprintln!("Error: {:#}", e);
        exit(1);
    }
}

/// Print file metadata, the column types, and the typed rows.
fn inspect(path: &Path) -> Result<()> {
    // 1) File-level metadata
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let reader = SerializedFileReader::new(file)?;
    let meta = reader.metadata();
    let file_meta = meta.file_metadata();

    println!("=== Parquet File: {} ===", path.display());
    println!(
        "Created by:           {}",
        file_meta.created_by().unwrap_or("<unknown>")
    );
    println!("Total rows:           {}", file_meta.num_rows());
    println!("Number of row groups: {}", meta.num_row_groups());
    println!();

    // 2) Columns as the record set sees them
    let records = export::read_record_set(path)?.normalized(&NumericColumns::default());
    println!("=== Columns ===");
    for col in records.columns() {
        let missing = col.values.iter().filter(|v| v.is_missing()).count();
        println!("- {:<30} | {:?} | missing: {}", col.name, col.kind, missing);
    }
    println!();

    // 3) Rows
    for page in render::paginate_records(&records, keeperstats::config::DEFAULT_ROWS_PER_PAGE) {
        println!("{}\n", page);
    }
    Ok(())
}

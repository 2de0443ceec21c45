use anyhow::Result;
use clap::Parser;
use keeperstats::{
    export, fetch, render, Config, HttpFetcher, Outcome, Pipeline,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Scrape the NCAA D1 goalkeeper leaderboard into a table.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// YAML config file; every key is optional.
    #[arg(short, long, env = "KEEPERSTATS_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL the page identifiers are appended to.
    #[arg(long)]
    base_url: Option<String>,

    /// Page identifier (repeatable). Overrides the configured list.
    #[arg(short, long = "page")]
    pages: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Write the merged table as CSV.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the typed record set as Parquet.
    #[arg(long)]
    parquet: Option<PathBuf>,

    /// Write Saves vs. save percentage points as JSON.
    #[arg(long)]
    points: Option<PathBuf>,

    /// Rows per printed table page.
    #[arg(long)]
    rows_per_page: Option<usize>,

    /// Do not print the table.
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn into_config(self) -> Result<(Config, bool)> {
        let mut cfg = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(base_url) = self.base_url {
            cfg.base_url = base_url;
        }
        if !self.pages.is_empty() {
            cfg.pages = self.pages;
        }
        if let Some(t) = self.timeout {
            cfg.timeout_secs = t;
        }
        if let Some(n) = self.rows_per_page {
            cfg.rows_per_page = n;
        }
        cfg.csv_path = self.csv.or(cfg.csv_path);
        cfg.parquet_path = self.parquet.or(cfg.parquet_path);
        cfg.points_path = self.points.or(cfg.points_path);
        cfg.validate()?;
        Ok((cfg, self.quiet))
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) configuration ────────────────────────────────────────────
    let (cfg, quiet) = Cli::parse().into_config()?;
    info!(base_url = %cfg.base_url, pages = ?cfg.pages, "startup");

    // ─── 3) scrape ───────────────────────────────────────────────────
    let urls = fetch::page_urls(&cfg.base_url, &cfg.pages)?;
    let fetcher = HttpFetcher::new(cfg.timeout(), &cfg.user_agent)?;
    let pipeline = Pipeline::new(fetcher, cfg.numeric_columns());

    let (table, records) = match pipeline.run(&urls) {
        Outcome::Data {
            table,
            records,
            reports,
            ..
        } => {
            let failed = reports.iter().filter(|r| r.result.is_err()).count();
            info!(pages = reports.len(), failed, rows = table.len(), "scrape finished");
            (table, records)
        }
        Outcome::Empty { reports } => {
            for r in &reports {
                if let Err(e) = &r.result {
                    error!(url = %r.url, at = %r.fetched_at, "{}", e);
                }
            }
            println!("No data to display.");
            return Ok(());
        }
    };

    // ─── 4) export ───────────────────────────────────────────────────
    if let Some(path) = &cfg.csv_path {
        export::write_table(path, &table)?;
    }
    if let Some(path) = &cfg.parquet_path {
        export::write_record_set(path, &records)?;
    }
    let points = render::scatter_points(&records);
    if points.len() < records.len() {
        warn!(
            plotted = points.len(),
            rows = records.len(),
            "some rows lack a name, saves or save percentage"
        );
    }
    if let Some(path) = &cfg.points_path {
        export::write_points(path, &points)?;
    }

    // ─── 5) display ──────────────────────────────────────────────────
    if !quiet {
        for page in render::paginate_records(&records, cfg.rows_per_page) {
            println!("{}\n", page);
        }
    }

    info!("all done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = Cli::parse_from([
            "keeperstats",
            "--page",
            "p1",
            "--page",
            "p4",
            "--timeout",
            "7",
            "--csv",
            "out.csv",
            "--quiet",
        ]);
        let (cfg, quiet) = cli.into_config().unwrap();
        assert!(quiet);
        assert_eq!(cfg.pages, vec!["p1", "p4"]);
        assert_eq!(cfg.timeout_secs, 7);
        assert_eq!(cfg.csv_path, Some(PathBuf::from("out.csv")));
        assert_eq!(cfg.base_url, keeperstats::config::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_cli_rejects_zero_rows_per_page() {
        let cli = Cli::parse_from(["keeperstats", "--rows-per-page", "0"]);
        assert!(cli.into_config().is_err());
    }
}

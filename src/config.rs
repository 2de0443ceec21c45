// src/config.rs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf, time::Duration};

use crate::normalize::NumericColumns;

/// Top-50 NCAA D1 men's soccer goalkeepers, by saves.
pub const DEFAULT_BASE_URL: &str = "https://www.ncaa.com/stats/soccer-men/d1/current/individual/421/";
pub const DEFAULT_PAGES: &[&str] = &["p1", "p2", "p3"];
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_ROWS_PER_PAGE: usize = 50;

/// Run configuration. Every field has a default, so an empty YAML file (or no
/// file at all) is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    /// Page identifiers appended verbatim to `base_url`, fetched in this order.
    pub pages: Vec<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub name_column: String,
    /// Accepted header names for the saves column; the first one present wins.
    pub saves_columns: Vec<String>,
    /// Accepted header names for the save percentage column.
    pub save_pct_columns: Vec<String>,
    pub rows_per_page: usize,
    pub csv_path: Option<PathBuf>,
    pub parquet_path: Option<PathBuf>,
    pub points_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let numeric = NumericColumns::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pages: DEFAULT_PAGES.iter().map(|p| p.to_string()).collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("keeperstats/{}", env!("CARGO_PKG_VERSION")),
            name_column: numeric.name,
            saves_columns: numeric.saves,
            save_pct_columns: numeric.save_pct,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            csv_path: None,
            parquet_path: None,
            points_path: None,
        }
    }
}

impl Config {
    /// Load a YAML config file. Missing keys fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {:?}", path))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            anyhow::bail!("base_url must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.rows_per_page == 0 {
            anyhow::bail!("rows_per_page must be greater than zero");
        }
        if self.saves_columns.is_empty() || self.save_pct_columns.is_empty() {
            anyhow::bail!("saves_columns and save_pct_columns need at least one name each");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn numeric_columns(&self) -> NumericColumns {
        NumericColumns {
            name: self.name_column.clone(),
            saves: self.saves_columns.clone(),
            save_pct: self.save_pct_columns.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_default_aliases_match_numeric_columns() {
        assert_eq!(Config::default().numeric_columns(), NumericColumns::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = Config::from_yaml("pages: [p1]\ntimeout_secs: 5\n").unwrap();
        assert_eq!(cfg.pages, vec!["p1".to_string()]);
        assert_eq!(cfg.timeout(), Duration::from_secs(5));
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.rows_per_page, DEFAULT_ROWS_PER_PAGE);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_yaml("timeout_secs: 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_load_from_file() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "base_url: \"http://localhost:8080/stats/\"").unwrap();
        writeln!(f, "csv_path: out.csv").unwrap();
        let cfg = Config::load(f.path()).unwrap();
        assert_eq!(cfg.base_url, "http://localhost:8080/stats/");
        assert_eq!(cfg.csv_path, Some(PathBuf::from("out.csv")));
        assert_eq!(cfg.numeric_columns().name, "Name");
    }
}

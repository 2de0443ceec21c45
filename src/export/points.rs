// src/export/points.rs

use anyhow::{Context, Result};
use std::{fs::File, io::BufWriter, io::Write, path::Path};
use tracing::info;

use crate::render::ScatterPoint;

/// Write the Saves vs. save percentage series as a pretty JSON array of
/// `{name, saves, save_pct}` objects, for whatever draws the scatter plot.
pub fn write_points<P: AsRef<Path>>(path: P, points: &[ScatterPoint]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, points).context("serializing scatter points")?;
    w.write_all(b"\n")?;
    w.flush()?;
    info!(path = %path.display(), points = points.len(), "scatter points written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_points_json_is_flat_array() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("points.json");
        let points = vec![
            ScatterPoint {
                name: "Alex Keeper".into(),
                saves: 98,
                save_pct: 85.3,
            },
            ScatterPoint {
                name: "Sam Gloves".into(),
                saves: 71,
                save_pct: 79.0,
            },
        ];

        write_points(&path, &points).unwrap();

        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let arr = v.as_array().expect("top level should be an array");
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["name"], "Alex Keeper");
        assert_eq!(arr[0]["saves"], 98);
        assert_eq!(arr[0]["save_pct"], 85.3);
        assert_eq!(arr[1]["name"], "Sam Gloves");
        assert_eq!(arr[0].as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_no_points_writes_empty_array() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("points.json");
        write_points(&path, &[]).unwrap();
        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(v, serde_json::json!([]));
    }
}

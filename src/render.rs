// src/render.rs

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table as AsciiTable};
use serde::Serialize;

use crate::normalize::{RecordSet, Value};
use crate::table::Table;

pub const TABLE_TITLE: &str = "Top NCAA Goalkeepers Stats";

/// One goalkeeper on the Saves vs. save percentage scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub name: String,
    pub saves: i64,
    pub save_pct: f64,
}

fn render_chunk<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let mut table = AsciiTable::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.as_ref()).add_attribute(Attribute::Bold)),
        );
    for row in rows {
        table.add_row(
            row.iter()
                .map(|c| Cell::new(c).set_alignment(CellAlignment::Center)),
        );
    }
    table.to_string()
}

fn paginate_rows<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>], rows_per_page: usize) -> Vec<String> {
    let per_page = rows_per_page.max(1);
    rows.chunks(per_page)
        .enumerate()
        .map(|(page, chunk)| {
            format!(
                "{} (Page {})\n{}",
                TABLE_TITLE,
                page + 1,
                render_chunk(headers, chunk)
            )
        })
        .collect()
}

/// Render the table as `ceil(len / rows_per_page)` titled text tables.
pub fn paginate(table: &Table, rows_per_page: usize) -> Vec<String> {
    paginate_rows(table.columns(), table.rows(), rows_per_page)
}

/// Same as [`paginate`], but shows typed values (`NA` for missing ones).
pub fn paginate_records(records: &RecordSet, rows_per_page: usize) -> Vec<String> {
    let headers: Vec<&str> = records.columns().iter().map(|c| c.name.as_str()).collect();
    let rows: Vec<Vec<String>> = (0..records.len())
        .map(|i| {
            records
                .columns()
                .iter()
                .map(|c| c.values[i].to_string())
                .collect()
        })
        .collect();
    paginate_rows(&headers, &rows, rows_per_page)
}

/// Points for the scatter plot, annotated by name. Rows lacking a name or
/// either numeric value are left out.
pub fn scatter_points(records: &RecordSet) -> Vec<ScatterPoint> {
    let roles = records.roles();
    let (Some(name_idx), Some(saves_idx), Some(pct_idx)) =
        (roles.name, roles.saves, roles.save_pct)
    else {
        return Vec::new();
    };
    let cols = records.columns();

    (0..records.len())
        .filter_map(|i| {
            let name = cols[name_idx].values[i].as_str()?.to_string();
            let saves = match &cols[saves_idx].values[i] {
                Value::Int(n) => *n,
                _ => return None,
            };
            let save_pct = cols[pct_idx].values[i].as_f64()?;
            Some(ScatterPoint {
                name,
                saves,
                save_pct,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, NumericColumns};
    use pretty_assertions::assert_eq;

    fn table(n: usize) -> Table {
        let rows = (0..n)
            .map(|i| vec![format!("Keeper {}", i), (200 - i).to_string(), format!("{}.5%", 70 + i)])
            .collect();
        Table::from_parts(vec!["Name".into(), "Saves".into(), "Pct.".into()], rows).0
    }

    #[test]
    fn test_paginate_splits_into_titled_pages() {
        let pages = paginate(&table(120), 50);
        assert_eq!(pages.len(), 3);
        assert!(pages[0].starts_with("Top NCAA Goalkeepers Stats (Page 1)"));
        assert!(pages[2].starts_with("Top NCAA Goalkeepers Stats (Page 3)"));
        assert!(pages[0].contains("Keeper 0"));
        assert!(!pages[0].contains("Keeper 50"));
        assert!(pages[2].contains("Keeper 119"));
    }

    #[test]
    fn test_paginate_single_page() {
        let pages = paginate(&table(3), 50);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("Saves"));
    }

    #[test]
    fn test_records_show_missing_marker() {
        let (t, _) = Table::from_parts(
            vec!["Name".into(), "Saves".into(), "Pct.".into()],
            vec![vec!["A".into(), "N/A".into(), "50%".into()]],
        );
        let rs = normalize(&t, &NumericColumns::default());
        let pages = paginate_records(&rs, 50);
        assert!(pages[0].contains("NA"));
    }

    #[test]
    fn test_scatter_points_skip_incomplete_rows() {
        let (t, _) = Table::from_parts(
            vec!["Name".into(), "Saves".into(), "Pct.".into()],
            vec![
                vec!["A".into(), "98".into(), "85.3%".into()],
                vec!["B".into(), "N/A".into(), "80%".into()],
                vec!["C".into(), "70".into(), "--".into()],
            ],
        );
        let rs = normalize(&t, &NumericColumns::default());
        assert_eq!(
            scatter_points(&rs),
            vec![ScatterPoint {
                name: "A".into(),
                saves: 98,
                save_pct: 85.3
            }]
        );
    }

    #[test]
    fn test_scatter_points_without_roles() {
        let rs = RecordSet::from_table(&table(2));
        assert!(scatter_points(&rs).is_empty());
    }
}

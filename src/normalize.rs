// src/normalize.rs

use std::{collections::BTreeMap, fmt};
use tracing::{debug, trace, warn};

use crate::table::{canonical_name, Table};

/// A single cell in the column-oriented view.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    /// The cell could not be read as the column's numeric type.
    /// Distinct from zero and from the empty string.
    Missing,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Missing => f.write_str("NA"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Int,
    Float,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Value>,
}

/// Which header names play which role. Each numeric role accepts several
/// spellings since the site has used both "Save Percentage" and "Pct.".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericColumns {
    pub name: String,
    pub saves: Vec<String>,
    pub save_pct: Vec<String>,
}

impl Default for NumericColumns {
    fn default() -> Self {
        Self {
            name: "Name".into(),
            saves: vec!["Saves".into()],
            save_pct: vec!["Save Percentage".into(), "Pct.".into()],
        }
    }
}

/// Column positions resolved against a record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Roles {
    pub name: Option<usize>,
    pub saves: Option<usize>,
    pub save_pct: Option<usize>,
}

/// Column-oriented view of a [`Table`], with the two known numeric columns typed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    columns: Vec<Column>,
    roles: Roles,
    /// Count of cells turned into [`Value::Missing`], keyed by column position
    /// so repeated header names keep separate counts.
    skipped: BTreeMap<usize, usize>,
}

impl RecordSet {
    /// Every column as text, nothing coerced yet.
    pub fn from_table(table: &Table) -> Self {
        let columns = table
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| Column {
                name: name.clone(),
                kind: ColumnKind::Text,
                values: table
                    .rows()
                    .iter()
                    .map(|r| Value::Text(r[idx].clone()))
                    .collect(),
            })
            .collect();
        Self::from_columns(columns)
    }

    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self {
            columns,
            roles: Roles::default(),
            skipped: BTreeMap::new(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn roles(&self) -> Roles {
        self.roles
    }

    pub fn skipped(&self) -> &BTreeMap<usize, usize> {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        let wanted = canonical_name(name);
        self.columns
            .iter()
            .position(|c| canonical_name(&c.name) == wanted)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index_of(name).map(|i| &self.columns[i])
    }

    fn find_any(&self, candidates: &[String]) -> Option<usize> {
        candidates.iter().find_map(|c| self.index_of(c))
    }

    /// Coerce the saves column to integers and the save percentage column to
    /// floats. Applying this to an already-normalized set changes nothing.
    pub fn normalized(mut self, numeric: &NumericColumns) -> Self {
        let roles = Roles {
            name: self.index_of(&numeric.name),
            saves: self.find_any(&numeric.saves),
            save_pct: self.find_any(&numeric.save_pct),
        };
        if roles.saves.is_none() {
            warn!(candidates = ?numeric.saves, "saves column not found");
        }
        if roles.save_pct.is_none() {
            warn!(candidates = ?numeric.save_pct, "save percentage column not found");
        }

        for (idx, kind) in [(roles.saves, ColumnKind::Int), (roles.save_pct, ColumnKind::Float)] {
            let Some(idx) = idx else { continue };
            let skipped = coerce_column(&mut self.columns[idx], kind);
            if skipped > 0 {
                *self.skipped.entry(idx).or_insert(0) += skipped;
            }
        }

        self.roles = roles;
        debug!(rows = self.len(), skipped = ?self.skipped, "normalized");
        self
    }
}

/// Convert a table into its record set and coerce the known numeric columns.
pub fn normalize(table: &Table, numeric: &NumericColumns) -> RecordSet {
    RecordSet::from_table(table).normalized(numeric)
}

fn coerce_column(column: &mut Column, kind: ColumnKind) -> usize {
    column.kind = kind;
    let mut skipped = 0;
    for (row, value) in column.values.iter_mut().enumerate() {
        let Value::Text(raw) = value else {
            continue;
        };
        let parsed = match kind {
            ColumnKind::Int => parse_int(raw).map(Value::Int),
            ColumnKind::Float => parse_float(raw).map(Value::Float),
            ColumnKind::Text => continue,
        };
        *value = parsed.unwrap_or_else(|| {
            trace!(column = %column.name, row, raw = %raw, "NumericCoercionSkipped");
            skipped += 1;
            Value::Missing
        });
    }
    skipped
}

/// Remove surrounding whitespace, one trailing percent sign and thousands separators.
fn strip_decoration(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim_end();
    s.replace(',', "")
}

/// Best-effort float parse; `None` for anything that is not a finite number.
pub fn parse_float(raw: &str) -> Option<f64> {
    let s = strip_decoration(raw);
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Best-effort integer parse. Whole floats such as `"12.0"` are accepted.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = strip_decoration(raw);
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

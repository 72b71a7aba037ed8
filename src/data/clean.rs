use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::model::{CellValue, ColumnKind, Table};

// ---------------------------------------------------------------------------
// Transform requests and their reports
// ---------------------------------------------------------------------------

/// A cleaning operation requested by the user for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transform {
    Deduplicate,
    DropColumns(Vec<String>),
    FillMissing,
}

/// What a transform changed, shown back to the user as a success notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformReport {
    DuplicatesRemoved(usize),
    ColumnsDropped(Vec<String>),
    MissingFilled(FillReport),
}

impl fmt::Display for TransformReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformReport::DuplicatesRemoved(n) => write!(f, "Duplicates removed ({n} rows)"),
            TransformReport::ColumnsDropped(cols) if cols.is_empty() => {
                write!(f, "No columns dropped")
            }
            TransformReport::ColumnsDropped(cols) => {
                write!(f, "Dropped columns: {}", cols.join(", "))
            }
            TransformReport::MissingFilled(report) => {
                write!(f, "Missing values filled ({} cells)", report.total_filled())?;
                if !report.skipped.is_empty() {
                    write!(f, "; no values to average in: {}", report.skipped.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// Outcome of [`fill_missing`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    /// `(column, cells filled)` for every numeric column that had gaps.
    pub filled: Vec<(String, usize)>,
    /// Numeric columns with no values at all, left untouched.
    pub skipped: Vec<String>,
}

impl FillReport {
    pub fn total_filled(&self) -> usize {
        self.filled.iter().map(|(_, n)| n).sum()
    }
}

/// Run a transform against the table in place.
pub fn apply(table: &mut Table, transform: &Transform) -> TransformReport {
    match transform {
        Transform::Deduplicate => TransformReport::DuplicatesRemoved(deduplicate(table)),
        Transform::DropColumns(names) => {
            TransformReport::ColumnsDropped(drop_columns(table, names.as_slice()))
        }
        Transform::FillMissing => TransformReport::MissingFilled(fill_missing(table)),
    }
}

// ---------------------------------------------------------------------------
// Deduplicate
// ---------------------------------------------------------------------------

/// Remove rows equal (in every column) to an earlier row, keeping the first
/// occurrence. Returns the number of rows removed.
pub fn deduplicate(table: &mut Table) -> usize {
    let keep: Vec<bool> = {
        let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(table.height());
        table.rows().map(|row| seen.insert(row)).collect()
    };
    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        table.retain_rows(&keep);
    }
    log::debug!("deduplicate removed {removed} rows");
    removed
}

// ---------------------------------------------------------------------------
// Drop columns
// ---------------------------------------------------------------------------

/// Remove the named columns. Names not in the table are ignored.
/// Returns the names actually removed, in table order.
pub fn drop_columns<S: AsRef<str>>(table: &mut Table, names: &[S]) -> Vec<String> {
    let wanted: BTreeSet<&str> = names.iter().map(AsRef::as_ref).collect();
    let mut dropped = Vec::new();
    table.columns_mut().retain(|col| {
        if wanted.contains(col.name.as_str()) {
            dropped.push(col.name.clone());
            false
        } else {
            true
        }
    });
    log::debug!("dropped columns {dropped:?}");
    dropped
}

// ---------------------------------------------------------------------------
// Fill missing
// ---------------------------------------------------------------------------

/// Replace missing values in every numeric column with the column mean.
///
/// A column with nothing to average is left as it is and reported in
/// [`FillReport::skipped`]. An integer column that receives a fill becomes a
/// float column.
pub fn fill_missing(table: &mut Table) -> FillReport {
    let mut report = FillReport::default();

    for col in table.columns_mut().iter_mut().filter(|c| c.kind.is_numeric()) {
        let gaps = col.missing_count();
        if gaps == 0 {
            continue;
        }
        let present = col.numeric_values();
        if present.is_empty() {
            log::warn!("column '{}' has no values to average, leaving it empty", col.name);
            report.skipped.push(col.name.clone());
            continue;
        }
        let mean = present.iter().sum::<f64>() / present.len() as f64;

        if col.kind == ColumnKind::Integer {
            col.kind = ColumnKind::Float;
        }
        for value in &mut col.values {
            *value = match &*value {
                CellValue::Null => CellValue::Float(mean),
                CellValue::Integer(i) => CellValue::Float(*i as f64),
                other => other.clone(),
            };
        }
        report.filled.push((col.name.clone(), gaps));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    fn name_val() -> Table {
        Table::new(vec![
            Column::new("name", ColumnKind::Text, vec![text("x"), text("x"), text("y")]),
            Column::new(
                "val",
                ColumnKind::Integer,
                vec![CellValue::Integer(1), CellValue::Integer(1), CellValue::Integer(2)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn deduplicate_keeps_first_occurrence() {
        let mut t = name_val();
        assert_eq!(deduplicate(&mut t), 1);
        assert_eq!(t.height(), 2);
        assert_eq!(t.column("name").unwrap().values, vec![text("x"), text("y")]);
        assert_eq!(
            t.column("val").unwrap().values,
            vec![CellValue::Integer(1), CellValue::Integer(2)]
        );
    }

    #[test]
    fn deduplicate_is_idempotent() {
        let mut once = name_val();
        deduplicate(&mut once);
        let mut twice = once.clone();
        assert_eq!(deduplicate(&mut twice), 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn deduplicate_treats_missing_as_equal() {
        let mut t = Table::new(vec![Column::new(
            "v",
            ColumnKind::Float,
            vec![CellValue::Null, CellValue::Float(1.0), CellValue::Null],
        )])
        .unwrap();
        assert_eq!(deduplicate(&mut t), 1);
        assert_eq!(t.height(), 2);
    }

    #[test]
    fn deduplicate_treats_signed_zeros_as_equal() {
        let mut t = crate::data::loader::decode_csv(b"v\n0.0\n-0.0\n").unwrap();
        assert_eq!(deduplicate(&mut t), 1);
        assert_eq!(t.height(), 1);
    }

    #[test]
    fn rows_differing_in_one_column_are_kept() {
        let mut t = Table::new(vec![
            Column::new("a", ColumnKind::Text, vec![text("x"), text("x")]),
            Column::new("b", ColumnKind::Text, vec![text("1"), text("2")]),
        ])
        .unwrap();
        assert_eq!(deduplicate(&mut t), 0);
    }

    #[test]
    fn drop_columns_ignores_unknown_names() {
        let mut t = name_val();
        let dropped = drop_columns(&mut t, &["val", "missing"]);
        assert_eq!(dropped, vec!["val".to_string()]);
        assert_eq!(t.column_names(), vec!["name"]);
        assert_eq!(t.column("name").unwrap().values.len(), 3);
    }

    #[test]
    fn drop_columns_preserves_remaining_order() {
        let mut t = Table::new(vec![
            Column::new("a", ColumnKind::Integer, vec![CellValue::Integer(1)]),
            Column::new("b", ColumnKind::Integer, vec![CellValue::Integer(2)]),
            Column::new("c", ColumnKind::Integer, vec![CellValue::Integer(3)]),
        ])
        .unwrap();
        drop_columns(&mut t, &["b"]);
        assert_eq!(t.column_names(), vec!["a", "c"]);
        assert_eq!(t.column("c").unwrap().values, vec![CellValue::Integer(3)]);
        assert!(drop_columns::<&str>(&mut t, &[]).is_empty());
    }

    #[test]
    fn fill_missing_uses_column_mean() {
        let mut t = Table::new(vec![Column::new(
            "val",
            ColumnKind::Float,
            vec![CellValue::Float(1.0), CellValue::Null, CellValue::Float(3.0)],
        )])
        .unwrap();
        let report = fill_missing(&mut t);
        assert_eq!(report.filled, vec![("val".to_string(), 1)]);
        let vals: Vec<f64> = t.column("val").unwrap().numeric_values();
        assert_eq!(vals, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn fill_missing_widens_integer_columns() {
        let mut t = Table::new(vec![Column::new(
            "n",
            ColumnKind::Integer,
            vec![CellValue::Integer(2), CellValue::Null],
        )])
        .unwrap();
        fill_missing(&mut t);
        let col = t.column("n").unwrap();
        assert_eq!(col.kind, ColumnKind::Float);
        assert_eq!(col.values, vec![CellValue::Float(2.0), CellValue::Float(2.0)]);
    }

    #[test]
    fn fill_missing_skips_empty_columns_and_text() {
        let mut t = Table::new(vec![
            Column::new("empty", ColumnKind::Float, vec![CellValue::Null, CellValue::Null]),
            Column::new("label", ColumnKind::Text, vec![CellValue::Null, text("a")]),
        ])
        .unwrap();
        let before = t.clone();
        let report = fill_missing(&mut t);
        assert_eq!(report.skipped, vec!["empty".to_string()]);
        assert_eq!(report.total_filled(), 0);
        assert_eq!(t, before);
    }

    #[test]
    fn apply_dispatches_and_reports() {
        let mut t = name_val();
        let report = apply(&mut t, &Transform::Deduplicate);
        assert_eq!(report, TransformReport::DuplicatesRemoved(1));
        assert_eq!(report.to_string(), "Duplicates removed (1 rows)");

        let report = apply(&mut t, &Transform::DropColumns(vec!["nope".into()]));
        assert_eq!(report.to_string(), "No columns dropped");
    }
}

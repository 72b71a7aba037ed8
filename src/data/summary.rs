use serde::Serialize;

use super::loader::UploadRecord;
use super::model::{Column, ColumnKind, Table};

/// Buckets per histogram.
pub const HISTOGRAM_BINS: usize = 15;

/// Numeric columns shown in the bar chart.
pub const BAR_SERIES: usize = 2;

pub const NO_NUMERIC_WARNING: &str = "No numeric columns available for visualization.";

// ---------------------------------------------------------------------------
// File info
// ---------------------------------------------------------------------------

/// Shape and size shown above each preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub size_kb: f64,
}

pub fn file_info(upload: &UploadRecord, table: &Table) -> FileInfo {
    FileInfo {
        name: upload.name.clone(),
        rows: table.height(),
        columns: table.width(),
        size_kb: upload.size_kb(),
    }
}

/// Per-column description used by `inspect` and the preview header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    table
        .columns()
        .iter()
        .map(|col| {
            let values = finite_values(col);
            let (mean, min, max) = if values.is_empty() {
                (None, None, None)
            } else {
                let sum: f64 = values.iter().sum();
                (
                    Some(sum / values.len() as f64),
                    values.iter().copied().reduce(f64::min),
                    values.iter().copied().reduce(f64::max),
                )
            };
            ColumnSummary {
                name: col.name.clone(),
                kind: col.kind,
                missing: col.missing_count(),
                mean,
                min,
                max,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Chart projections
// ---------------------------------------------------------------------------

/// One bar series: the value of every row (by position) in a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    /// `None` where the row is missing; no bar is drawn there.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    /// Empty when the column has no values.
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Both projections for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub bar: Vec<BarSeries>,
    pub histograms: Vec<Histogram>,
}

/// Build chart data, or `None` when the table has no numeric column
/// (the caller shows [`NO_NUMERIC_WARNING`]).
pub fn chart_data(table: &Table) -> Option<ChartData> {
    if table.numeric_columns().next().is_none() {
        return None;
    }
    Some(ChartData {
        bar: bar_projection(table),
        histograms: table
            .numeric_columns()
            .map(|col| histogram(col, HISTOGRAM_BINS))
            .collect(),
    })
}

/// The first [`BAR_SERIES`] numeric columns, indexed by row position.
pub fn bar_projection(table: &Table) -> Vec<BarSeries> {
    table
        .numeric_columns()
        .take(BAR_SERIES)
        .map(|col| BarSeries {
            name: col.name.clone(),
            values: col
                .values
                .iter()
                .map(|v| v.as_f64().filter(|f| f.is_finite()))
                .collect(),
        })
        .collect()
}

/// Equal-width histogram of a column's values.
pub fn histogram(column: &Column, bins: usize) -> Histogram {
    Histogram {
        column: column.name.clone(),
        bins: bin_values(&finite_values(column), bins),
    }
}

/// Split `[min, max]` into `bins` equal buckets, the last one closed on the
/// right. A degenerate range is widened to `[v - 0.5, v + 0.5]`.
pub fn bin_values(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

fn finite_values(col: &Column) -> Vec<f64> {
    col.numeric_values()
        .into_iter()
        .filter(|f| f.is_finite())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn numeric(name: &str, values: &[Option<f64>]) -> Column {
        Column::new(
            name,
            ColumnKind::Float,
            values
                .iter()
                .map(|v| v.map_or(CellValue::Null, CellValue::Float))
                .collect(),
        )
    }

    #[test]
    fn no_numeric_columns_means_no_charts() {
        let t = Table::new(vec![Column::new(
            "label",
            ColumnKind::Text,
            vec![CellValue::String("a".into())],
        )])
        .unwrap();
        assert!(chart_data(&t).is_none());
    }

    #[test]
    fn bar_uses_first_two_numeric_columns() {
        let t = Table::new(vec![
            Column::new("label", ColumnKind::Text, vec![CellValue::Null, CellValue::Null]),
            numeric("a", &[Some(1.0), None]),
            numeric("b", &[Some(2.0), Some(3.0)]),
            numeric("c", &[Some(4.0), Some(5.0)]),
        ])
        .unwrap();
        let charts = chart_data(&t).unwrap();
        let names: Vec<&str> = charts.bar.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(charts.bar[0].values, vec![Some(1.0), None]);
        assert_eq!(charts.histograms.len(), 3);
    }

    #[test]
    fn histogram_has_fifteen_buckets_and_conserves_count() {
        let values: Vec<Option<f64>> = (0..100_i32).map(|i| Some(f64::from(i))).collect();
        let h = histogram(&numeric("v", &values), HISTOGRAM_BINS);
        assert_eq!(h.bins.len(), 15);
        assert_eq!(h.total(), 100);
        assert_eq!(h.bins[0].start, 0.0);
        assert_eq!(h.bins[14].end, 99.0);
        // the maximum lands in the last, right-closed bucket
        assert!(h.bins[14].count >= 1);
    }

    #[test]
    fn constant_column_is_centered() {
        let bins = bin_values(&[3.0, 3.0], 15);
        assert_eq!(bins.len(), 15);
        assert_eq!(bins[0].start, 2.5);
        assert_eq!(bins[14].end, 3.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(bins[7].count, 2);
    }

    #[test]
    fn all_missing_column_has_no_buckets() {
        let h = histogram(&numeric("v", &[None, None]), HISTOGRAM_BINS);
        assert!(h.bins.is_empty());
    }

    #[test]
    fn describe_reports_numeric_stats() {
        let t = Table::new(vec![numeric("v", &[Some(1.0), None, Some(3.0)])]).unwrap();
        let summary = describe(&t);
        assert_eq!(summary[0].missing, 1);
        assert_eq!(summary[0].mean, Some(2.0));
        assert_eq!(summary[0].min, Some(1.0));
        assert_eq!(summary[0].max, Some(3.0));
    }
}

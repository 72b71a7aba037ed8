use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use super::error::{PipelineError, Result};
use super::model::{CellValue, Column, ColumnKind, Table};

/// Tokens read as a missing value (in addition to the empty string).
const NA_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

// ---------------------------------------------------------------------------
// Upload record
// ---------------------------------------------------------------------------

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    /// Extensions offered by file pickers.
    pub const EXTENSIONS: [&'static str; 2] = ["csv", "xlsx"];

    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" => Ok(SourceFormat::Xlsx),
            other => Err(PipelineError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// One uploaded file: its name, declared extension and raw bytes.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub name: String,
    /// Lower-cased, without the leading dot. Empty when the name has none.
    pub extension: String,
    pub size: usize,
    pub bytes: Vec<u8>,
}

impl UploadRecord {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let extension = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        Self {
            size: bytes.len(),
            name,
            extension,
            bytes,
        }
    }

    /// Read a file from disk into an upload record.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, bytes))
    }

    /// Size in KB rounded to two decimals.
    pub fn size_kb(&self) -> f64 {
        (self.size as f64 / 1024.0 * 100.0).round() / 100.0
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Decode an upload into a table.  Dispatch by declared extension.
///
/// Supported formats:
/// * `.csv`  – comma-separated, header first
/// * `.xlsx` – first worksheet, header in the first used row
pub fn decode(upload: &UploadRecord) -> Result<Table> {
    match SourceFormat::from_extension(&upload.extension)? {
        SourceFormat::Csv => decode_csv(&upload.bytes),
        SourceFormat::Xlsx => decode_xlsx(&upload.bytes),
    }
}

/// Read and decode a file from disk.
pub fn load_file(path: &Path) -> Result<Table> {
    decode(&UploadRecord::from_path(path)?)
}

// ---------------------------------------------------------------------------
// Raw cells and type inference
// ---------------------------------------------------------------------------

/// A cell before its column kind is known. `text` is the source form kept
/// for columns that end up as text.
#[derive(Debug, Clone)]
struct RawCell {
    text: String,
    scalar: Scalar,
}

#[derive(Debug, Clone, Copy)]
enum Scalar {
    Missing,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text,
}

impl RawCell {
    fn missing() -> Self {
        RawCell {
            text: String::new(),
            scalar: Scalar::Missing,
        }
    }

    fn parse(field: &str) -> Self {
        let scalar = if is_na(field) {
            Scalar::Missing
        } else if let Ok(i) = field.trim().parse::<i64>() {
            Scalar::Int(i)
        } else if let Some(f) = parse_float(field) {
            Scalar::Float(f)
        } else if let Some(b) = parse_bool(field) {
            Scalar::Bool(b)
        } else {
            Scalar::Text
        };
        RawCell {
            text: field.to_string(),
            scalar,
        }
    }
}

fn is_na(field: &str) -> bool {
    field.is_empty() || NA_TOKENS.contains(&field)
}

/// Finite decimal numbers only; `inf`/`nan` spellings stay text.
fn parse_float(field: &str) -> Option<f64> {
    let trimmed = field.trim();
    let looks_numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !looks_numeric {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_bool(field: &str) -> Option<bool> {
    match field {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Pick the column kind from its raw cells and materialise the values.
///
/// * all integers, nothing missing      → `Integer`
/// * all numbers (or only missing)      → `Float`
/// * all booleans                       → `Boolean`
/// * anything else, or no rows at all   → `Text`, keeping the source text
fn infer_column(name: String, cells: Vec<RawCell>) -> Column {
    let mut any_missing = false;
    let mut all_int = true;
    let mut all_number = true;
    let mut all_bool = true;
    for cell in &cells {
        match cell.scalar {
            Scalar::Missing => any_missing = true,
            Scalar::Int(_) => all_bool = false,
            Scalar::Float(_) => {
                all_int = false;
                all_bool = false;
            }
            Scalar::Bool(_) => {
                all_int = false;
                all_number = false;
            }
            Scalar::Text => {
                all_int = false;
                all_number = false;
                all_bool = false;
            }
        }
    }
    let any_present = cells.iter().any(|c| !matches!(c.scalar, Scalar::Missing));

    let kind = if cells.is_empty() {
        ColumnKind::Text
    } else if !any_present {
        ColumnKind::Float
    } else if all_int && !any_missing {
        ColumnKind::Integer
    } else if all_number {
        ColumnKind::Float
    } else if all_bool {
        ColumnKind::Boolean
    } else {
        ColumnKind::Text
    };

    let values = cells
        .into_iter()
        .map(|cell| match (kind, cell.scalar) {
            (_, Scalar::Missing) => CellValue::Null,
            (ColumnKind::Integer, Scalar::Int(i)) => CellValue::Integer(i),
            (ColumnKind::Float, Scalar::Int(i)) => CellValue::Float(i as f64),
            (ColumnKind::Float, Scalar::Float(f)) => CellValue::Float(f),
            (ColumnKind::Boolean, Scalar::Bool(b)) => CellValue::Bool(b),
            _ => CellValue::String(cell.text),
        })
        .collect();

    Column::new(name, kind, values)
}

/// Empty headers become `Unnamed: <index>`; repeats get `.1`, `.2`, … suffixes.
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (idx, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {idx}")
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while taken.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

fn build_table(headers: Vec<String>, mut columns: Vec<Vec<RawCell>>) -> Result<Table> {
    let headers = normalize_headers(headers);
    columns.resize_with(headers.len(), Vec::new);
    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, cells)| infer_column(name, cells))
        .collect();
    Table::new(columns)
}

// ---------------------------------------------------------------------------
// CSV decoder
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one record per row.
/// Short records are padded with missing values, long records are an error.
pub fn decode_csv(bytes: &[u8]) -> Result<Table> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(str::to_string).collect(),
        None => return Err(PipelineError::InvalidTable("no columns to parse from file".into())),
    };
    let width = headers.len();
    let mut columns: Vec<Vec<RawCell>> = vec![Vec::new(); width];

    for result in records {
        let record = result?;
        if record.len() > width {
            let line = record.position().map_or(0, |p| p.line());
            return Err(PipelineError::InvalidTable(format!(
                "expected {width} fields in line {line}, saw {}",
                record.len()
            )));
        }
        for (idx, cells) in columns.iter_mut().enumerate() {
            cells.push(record.get(idx).map_or_else(RawCell::missing, RawCell::parse));
        }
    }

    log::debug!("decoded CSV with {width} columns");
    build_table(headers, columns)
}

// ---------------------------------------------------------------------------
// Excel decoder
// ---------------------------------------------------------------------------

/// Read the first worksheet of an `.xlsx` workbook.
pub fn decode_xlsx(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PipelineError::Excel("workbook has no worksheets".into()))??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(header_text).collect(),
        None => return Err(PipelineError::InvalidTable("no columns to parse from file".into())),
    };
    let mut columns: Vec<Vec<RawCell>> = vec![Vec::new(); headers.len()];

    for row in rows {
        for (idx, cells) in columns.iter_mut().enumerate() {
            cells.push(row.get(idx).map_or_else(RawCell::missing, excel_cell));
        }
    }

    log::debug!("decoded worksheet with {} columns", headers.len());
    build_table(headers, columns)
}

fn bool_text(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => bool_text(*b).to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
    }
}

/// Excel cells carry their own type, so strings are never re-parsed as
/// numbers. Integral floats count as integers, date cells as their serial.
fn excel_cell(cell: &Data) -> RawCell {
    let (text, scalar) = match cell {
        Data::Empty | Data::Error(_) => return RawCell::missing(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if is_na(s) {
                return RawCell::missing();
            }
            (s.clone(), Scalar::Text)
        }
        Data::Int(i) => (i.to_string(), Scalar::Int(*i)),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
            (format!("{}", *f as i64), Scalar::Int(*f as i64))
        }
        Data::Float(f) => (f.to_string(), Scalar::Float(*f)),
        Data::Bool(b) => (bool_text(*b).to_string(), Scalar::Bool(*b)),
        Data::DateTime(dt) => (dt.as_f64().to_string(), Scalar::Float(dt.as_f64())),
    };
    RawCell { text, scalar }
}

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rust_xlsxwriter::Workbook;
use serde_json::{Map, Value as JsonValue};

use super::error::{PipelineError, Result};
use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Target formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Excel, ExportFormat::Json];

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Excel => "Excel",
            ExportFormat::Json => "JSON",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
        }
    }

    /// Extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format '{other}' (expected csv, excel or json)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Export buffer
// ---------------------------------------------------------------------------

/// Encoded bytes ready to be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBuffer {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Swap the extension of `source_name` for the one of `format`.
pub fn export_file_name(source_name: &str, format: ExportFormat) -> String {
    let path = Path::new(source_name);
    let stem = match path.extension() {
        Some(_) => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        None => path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_name.to_string()),
    };
    format!("{stem}.{}", format.extension())
}

/// Encode `table` in `format`, naming the result after `source_name`.
pub fn encode(table: &Table, format: ExportFormat, source_name: &str) -> Result<ExportBuffer> {
    let bytes = match format {
        ExportFormat::Csv => encode_csv(table)?,
        ExportFormat::Excel => encode_xlsx(table)?,
        ExportFormat::Json => encode_json(table)?,
    };
    let file_name = export_file_name(source_name, format);
    log::info!("encoded {source_name} as {format} ({} bytes) → {file_name}", bytes.len());
    Ok(ExportBuffer {
        file_name,
        mime: format.mime(),
        bytes,
    })
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Header row, then one record per row. No index column.
pub fn encode_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if table.width() > 0 {
        writer.write_record(table.column_names())?;
    }
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.into_inner().map_err(|e| PipelineError::Encode {
        format: "CSV",
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Excel
// ---------------------------------------------------------------------------

/// Single worksheet, header in row 0. Missing cells are left blank.
pub fn encode_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (c, column) in table.columns().iter().enumerate() {
        let col = xlsx_col(c)?;
        sheet.write_string(0, col, column.name.as_str())?;
        for (r, value) in column.values.iter().enumerate() {
            let row = xlsx_row(r + 1)?;
            match value {
                CellValue::Null => {}
                CellValue::Integer(i) => {
                    sheet.write_number(row, col, *i as f64)?;
                }
                CellValue::Float(f) if f.is_finite() => {
                    sheet.write_number(row, col, *f)?;
                }
                CellValue::Float(_) => {}
                CellValue::Bool(b) => {
                    sheet.write_boolean(row, col, *b)?;
                }
                CellValue::String(s) => {
                    sheet.write_string(row, col, s.as_str())?;
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn xlsx_row(idx: usize) -> Result<u32> {
    u32::try_from(idx).map_err(|_| PipelineError::Encode {
        format: "Excel",
        reason: format!("row {idx} is beyond the worksheet limit"),
    })
}

fn xlsx_col(idx: usize) -> Result<u16> {
    u16::try_from(idx).map_err(|_| PipelineError::Encode {
        format: "Excel",
        reason: format!("column {idx} is beyond the worksheet limit"),
    })
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Array of row objects, keys in column order:
///
/// ```json
/// [{"name":"x","val":1},{"name":"y","val":2}]
/// ```
pub fn encode_json(table: &Table) -> Result<Vec<u8>> {
    let names = table.column_names();
    let records: Vec<JsonValue> = table
        .rows()
        .map(|row| {
            let object: Map<String, JsonValue> = names
                .iter()
                .zip(row)
                .map(|(name, value)| (name.to_string(), json_value(value)))
                .collect();
            JsonValue::Object(object)
        })
        .collect();
    Ok(serde_json::to_vec(&records)?)
}

fn json_value(value: &CellValue) -> JsonValue {
    match value {
        CellValue::Null => JsonValue::Null,
        CellValue::Integer(i) => JsonValue::from(*i),
        // `from` maps non-finite floats to null
        CellValue::Float(f) => JsonValue::from(*f),
        CellValue::Bool(b) => JsonValue::Bool(*b),
        CellValue::String(s) => JsonValue::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::decode_csv;
    use crate::data::model::{Column, ColumnKind};

    fn two_by_two() -> Table {
        Table::new(vec![
            Column::new(
                "name",
                ColumnKind::Text,
                vec![CellValue::String("x".into()), CellValue::String("y".into())],
            ),
            Column::new(
                "val",
                ColumnKind::Float,
                vec![CellValue::Float(1.5), CellValue::Null],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn file_name_replaces_extension() {
        assert_eq!(export_file_name("sales.xlsx", ExportFormat::Csv), "sales.csv");
        assert_eq!(export_file_name("a.b.csv", ExportFormat::Json), "a.b.json");
        assert_eq!(export_file_name("README", ExportFormat::Excel), "README.xlsx");
    }

    #[test]
    fn csv_has_header_and_no_index() {
        let bytes = encode_csv(&two_by_two()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "name,val\nx,1.5\ny,\n");
    }

    #[test]
    fn csv_round_trips_through_decoder() {
        let original = decode_csv(b"id,score,flag,label\n1,2.0,True,a\n2,,False,\n3,4.5,True,c\n")
            .unwrap();
        let again = decode_csv(&encode_csv(&original).unwrap()).unwrap();
        assert_eq!(original, again);
    }

    #[test]
    fn large_whole_floats_stay_float_after_round_trip() {
        let t = Table::new(vec![Column::new(
            "v",
            ColumnKind::Float,
            vec![CellValue::Float(1e16), CellValue::Float(2e16)],
        )])
        .unwrap();
        let back = decode_csv(&encode_csv(&t).unwrap()).unwrap();
        assert_eq!(back.column("v").unwrap().kind, ColumnKind::Float);
        assert_eq!(t, back);
    }

    #[test]
    fn json_is_array_of_row_objects() {
        let bytes = encode_json(&two_by_two()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"[{"name":"x","val":1.5},{"name":"y","val":null}]"#);
        let parsed: Vec<Map<String, JsonValue>> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(parsed.iter().all(|o| o.contains_key("name") && o.contains_key("val")));
    }

    #[test]
    fn excel_output_decodes_back() {
        let bytes = encode_xlsx(&two_by_two()).unwrap();
        let table = crate::data::loader::decode_xlsx(&bytes).unwrap();
        assert_eq!(table.column_names(), vec!["name", "val"]);
        assert_eq!(table.height(), 2);
        assert_eq!(table.column("val").unwrap().values[1], CellValue::Null);
    }

    #[test]
    fn encode_sets_mime_and_name() {
        let buffer = encode(&two_by_two(), ExportFormat::Excel, "data.csv").unwrap();
        assert_eq!(buffer.file_name, "data.xlsx");
        assert_eq!(
            buffer.mime,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert!(buffer.bytes.starts_with(b"PK"));
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!("parquet".parse::<ExportFormat>().is_err());
    }
}

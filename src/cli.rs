use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use smart_clean::data::summary::{
    self, ColumnSummary, FileInfo, Histogram, HISTOGRAM_BINS, NO_NUMERIC_WARNING,
};
use smart_clean::data::{loader, ExportFormat, Table, Transform, UploadRecord};

use crate::state::DEFAULT_PREVIEW_ROWS;

#[derive(Parser)]
#[command(
    name = "smart-clean",
    version,
    about = "Clean, chart and convert CSV & Excel files. Runs the desktop app when no command is given."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Rows shown in each preview
    #[arg(long, global = true, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview_rows: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean files and write them in another format
    Convert {
        /// Input .csv or .xlsx files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: csv, excel or json
        #[arg(long, default_value_t = ExportFormat::Csv)]
        to: ExportFormat,

        /// Remove duplicate rows
        #[arg(long)]
        dedup: bool,

        /// Column to drop (repeatable)
        #[arg(long = "drop", value_name = "COLUMN")]
        drop: Vec<String>,

        /// Fill missing numeric values with the column mean
        #[arg(long)]
        fill_missing: bool,

        /// Directory for the converted files
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Print file info, a preview and column statistics
    Inspect {
        /// Input .csv or .xlsx files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Emit a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
}

pub fn run_command(command: Commands, preview_rows: usize) -> Result<()> {
    match command {
        Commands::Convert {
            files,
            to,
            dedup,
            drop,
            fill_missing,
            out_dir,
        } => {
            let transforms = transforms_for(dedup, drop, fill_missing);
            handle_convert(&files, &transforms, to, &out_dir)
        }
        Commands::Inspect { files, json } => handle_inspect(&files, preview_rows, json),
    }
}

/// Cleaning steps in the order they run: dedup, drop, fill.
fn transforms_for(dedup: bool, drop: Vec<String>, fill_missing: bool) -> Vec<Transform> {
    let mut transforms = Vec::new();
    if dedup {
        transforms.push(Transform::Deduplicate);
    }
    if !drop.is_empty() {
        transforms.push(Transform::DropColumns(drop));
    }
    if fill_missing {
        transforms.push(Transform::FillMissing);
    }
    transforms
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

fn handle_convert(
    files: &[PathBuf],
    transforms: &[Transform],
    format: ExportFormat,
    out_dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut failed = 0;
    for path in files {
        match convert_one(path, transforms, format, out_dir) {
            Ok(target) => println!("✅ {} → {}", path.display(), target.display()),
            Err(e) => {
                log::error!("{}: {e:#}", path.display());
                eprintln!("❌ {}: {e:#}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed", files.len());
    }
    Ok(())
}

fn convert_one(
    path: &Path,
    transforms: &[Transform],
    format: ExportFormat,
    out_dir: &Path,
) -> Result<PathBuf> {
    let upload = UploadRecord::from_path(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let output = smart_clean::process(&upload, transforms, format)?;
    for report in &output.reports {
        println!("   {report}");
    }

    let target = out_dir.join(&output.export.file_name);
    if same_file(path, &target) {
        bail!("refusing to overwrite the input file {}", target.display());
    }
    std::fs::write(&target, &output.export.bytes)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct InspectReport {
    file: FileInfo,
    columns: Vec<ColumnSummary>,
    /// `None` when the table has no numeric column.
    histograms: Option<Vec<Histogram>>,
}

fn inspect_report(upload: &UploadRecord, table: &Table) -> InspectReport {
    InspectReport {
        file: summary::file_info(upload, table),
        columns: summary::describe(table),
        histograms: summary::chart_data(table).map(|c| c.histograms),
    }
}

fn handle_inspect(files: &[PathBuf], preview_rows: usize, json: bool) -> Result<()> {
    let mut reports = Vec::new();
    let mut failed = 0;
    for path in files {
        let loaded = UploadRecord::from_path(path)
            .map_err(anyhow::Error::from)
            .and_then(|upload| Ok((loader::decode(&upload)?, upload)));
        match loaded {
            Ok((table, upload)) => {
                let report = inspect_report(&upload, &table);
                if json {
                    reports.push(report);
                } else {
                    print_report(&report, &table.head(preview_rows));
                }
            }
            Err(e) => {
                log::error!("{}: {e:#}", path.display());
                eprintln!("❌ {}: {e:#}", path.display());
                failed += 1;
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    if failed > 0 {
        bail!("{failed} of {} files failed", files.len());
    }
    Ok(())
}

fn print_report(report: &InspectReport, preview: &Table) {
    let info = &report.file;
    println!("📂 {}", info.name);
    println!(
        "   Rows: {} | Columns: {} | File Size: {} KB",
        info.rows, info.columns, info.size_kb
    );

    println!();
    println!("   {}", preview.column_names().join(" | "));
    for row in preview.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|v| if v.is_missing() { "NaN".to_string() } else { v.to_string() })
            .collect();
        println!("   {}", cells.join(" | "));
    }

    println!();
    for col in &report.columns {
        print!("   {:<20} {:<8} missing={}", col.name, col.kind.to_string(), col.missing);
        if let (Some(mean), Some(min), Some(max)) = (col.mean, col.min, col.max) {
            print!(" mean={mean:.4} min={min} max={max}");
        }
        println!();
    }

    println!();
    match &report.histograms {
        Some(histograms) => {
            for h in histograms {
                let counts: Vec<String> = h.bins.iter().map(|b| b.count.to_string()).collect();
                println!("   {} ({HISTOGRAM_BINS} bins): {}", h.column, counts.join(" "));
            }
        }
        None => println!("   ⚠ {NO_NUMERIC_WARNING}"),
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_run_dedup_drop_fill() {
        let transforms = transforms_for(true, vec!["a".into()], true);
        assert_eq!(
            transforms,
            vec![
                Transform::Deduplicate,
                Transform::DropColumns(vec!["a".into()]),
                Transform::FillMissing,
            ]
        );
        assert!(transforms_for(false, Vec::new(), false).is_empty());
    }

    #[test]
    fn parses_convert_flags() {
        let cli = Cli::try_parse_from([
            "smart-clean",
            "convert",
            "a.csv",
            "--to",
            "xlsx",
            "--drop",
            "x",
            "--drop",
            "y",
            "--fill-missing",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Convert { files, to, drop, fill_missing, dedup, .. }) => {
                assert_eq!(files, vec![PathBuf::from("a.csv")]);
                assert_eq!(to, ExportFormat::Excel);
                assert_eq!(drop, vec!["x", "y"]);
                assert!(fill_missing);
                assert!(!dedup);
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn no_command_means_gui() {
        let cli = Cli::try_parse_from(["smart-clean"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.preview_rows, DEFAULT_PREVIEW_ROWS);
    }

    #[test]
    fn refuses_to_overwrite_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        std::fs::write(&input, "v\n1\n").unwrap();
        let err = convert_one(&input, &[], ExportFormat::Csv, dir.path()).unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
        assert_eq!(std::fs::read_to_string(&input).unwrap(), "v\n1\n");
    }
}

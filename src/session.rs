use std::collections::BTreeMap;
use std::fmt;

use crate::data::clean::{self, Transform, TransformReport};
use crate::data::error::{PipelineError, Result};
use crate::data::export::{self, ExportBuffer, ExportFormat};
use crate::data::loader::{self, UploadRecord};
use crate::data::model::Table;
use crate::data::summary::{self, ChartData, FileInfo};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Identifies one uploaded file for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An upload together with the current (possibly cleaned) table.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub upload: UploadRecord,
    pub table: Table,
}

/// Every file uploaded in this session, in upload order.
///
/// Tables change only through [`Session::apply`]; charts and exports always
/// read the current table.
#[derive(Debug, Default)]
pub struct Session {
    files: BTreeMap<FileId, LoadedFile>,
    next_id: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and store an upload. Uploading a name already present replaces
    /// that file's table and keeps its id.
    pub fn upload(&mut self, upload: UploadRecord) -> Result<FileId> {
        let table = loader::decode(&upload)?;
        log::info!(
            "Loaded {} with {} rows and columns {:?}",
            upload.name,
            table.height(),
            table.column_names()
        );

        let id = match self.find(&upload.name) {
            Some(existing) => existing,
            None => {
                let id = FileId(self.next_id);
                self.next_id += 1;
                id
            }
        };
        warn_if_unchartable(&upload.name, &table);
        self.files.insert(id, LoadedFile { upload, table });
        Ok(id)
    }

    /// Upload several files; a failure on one does not stop the others.
    pub fn upload_all(
        &mut self,
        uploads: impl IntoIterator<Item = UploadRecord>,
    ) -> Vec<(String, Result<FileId>)> {
        uploads
            .into_iter()
            .map(|upload| {
                let name = upload.name.clone();
                let result = self.upload(upload);
                if let Err(e) = &result {
                    log::error!("Failed to load {name}: {e}");
                }
                (name, result)
            })
            .collect()
    }

    pub fn get(&self, id: FileId) -> Result<&LoadedFile> {
        self.files.get(&id).ok_or(PipelineError::UnknownFile(id.0))
    }

    pub fn table(&self, id: FileId) -> Result<&Table> {
        self.get(id).map(|f| &f.table)
    }

    pub fn find(&self, name: &str) -> Option<FileId> {
        self.files
            .iter()
            .find(|(_, f)| f.upload.name == name)
            .map(|(id, _)| *id)
    }

    pub fn ids(&self) -> Vec<FileId> {
        self.files.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &LoadedFile)> {
        self.files.iter().map(|(id, f)| (*id, f))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Run one cleaning transform against a file's current table.
    pub fn apply(&mut self, id: FileId, transform: &Transform) -> Result<TransformReport> {
        let file = self
            .files
            .get_mut(&id)
            .ok_or(PipelineError::UnknownFile(id.0))?;
        let report = clean::apply(&mut file.table, transform);
        log::info!("{}: {report}", file.upload.name);
        warn_if_unchartable(&file.upload.name, &file.table);
        Ok(report)
    }

    /// Chart projections, or `Ok(None)` when there is nothing numeric to plot.
    pub fn chart_data(&self, id: FileId) -> Result<Option<ChartData>> {
        self.table(id).map(summary::chart_data)
    }

    pub fn info(&self, id: FileId) -> Result<FileInfo> {
        let file = self.get(id)?;
        Ok(summary::file_info(&file.upload, &file.table))
    }

    pub fn preview(&self, id: FileId, rows: usize) -> Result<Table> {
        self.table(id).map(|t| t.head(rows))
    }

    /// Encode the current table. Nothing in the session changes.
    pub fn export(&self, id: FileId, format: ExportFormat) -> Result<ExportBuffer> {
        let file = self.get(id)?;
        export::encode(&file.table, format, &file.upload.name)
    }

    pub fn remove(&mut self, id: FileId) -> Option<LoadedFile> {
        self.files.remove(&id)
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

fn warn_if_unchartable(name: &str, table: &Table) {
    if table.numeric_columns().next().is_none() {
        log::warn!("{name}: {}", summary::NO_NUMERIC_WARNING);
    }
}

// ---------------------------------------------------------------------------
// One-shot pipeline
// ---------------------------------------------------------------------------

/// Everything produced by [`process`].
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub table: Table,
    pub reports: Vec<TransformReport>,
    pub charts: Option<ChartData>,
    pub export: ExportBuffer,
}

/// Decode, apply `transforms` in order, chart and encode a single upload.
pub fn process(
    upload: &UploadRecord,
    transforms: &[Transform],
    format: ExportFormat,
) -> Result<ProcessOutput> {
    let mut table = loader::decode(upload)?;
    let reports = transforms
        .iter()
        .map(|t| clean::apply(&mut table, t))
        .collect();
    warn_if_unchartable(&upload.name, &table);
    let charts = summary::chart_data(&table);
    let export = export::encode(&table, format, &upload.name)?;
    Ok(ProcessOutput {
        table,
        reports,
        charts,
        export,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(name: &str, text: &str) -> UploadRecord {
        UploadRecord::new(name, text.as_bytes().to_vec())
    }

    #[test]
    fn reupload_replaces_table_and_keeps_id() {
        let mut session = Session::new();
        let first = session.upload(csv("a.csv", "v\n1\n")).unwrap();
        let second = session.upload(csv("a.csv", "v\n1\n2\n")).unwrap();
        assert_eq!(first, second);
        assert_eq!(session.len(), 1);
        assert_eq!(session.table(first).unwrap().height(), 2);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut session = Session::new();
        let id = session.upload(csv("a.csv", "v\n1\n")).unwrap();
        session.remove(id);
        assert!(matches!(
            session.apply(id, &Transform::Deduplicate),
            Err(PipelineError::UnknownFile(_))
        ));
    }

    #[test]
    fn process_runs_transforms_in_order() {
        let upload = csv("a.csv", "name,val\nx,1\nx,1\ny,\n");
        let out = process(
            &upload,
            &[Transform::Deduplicate, Transform::FillMissing],
            ExportFormat::Csv,
        )
        .unwrap();
        assert_eq!(out.reports.len(), 2);
        assert_eq!(out.table.height(), 2);
        assert_eq!(
            String::from_utf8(out.export.bytes).unwrap(),
            "name,val\nx,1.0\ny,1.0\n"
        );
        assert!(out.charts.is_some());
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use smart_clean::data::{ExportBuffer, ExportFormat, Transform, TransformReport, UploadRecord};
use smart_clean::{FileId, Session};

/// Rows shown in each preview grid.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Notices kept (and shown) per file.
pub const MAX_NOTICES: usize = 3;

// ---------------------------------------------------------------------------
// Notices shown under a file card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Per-file widget state
// ---------------------------------------------------------------------------

/// Widget state for one uploaded file. The table itself lives in the
/// [`Session`].
#[derive(Debug, Clone, Default)]
pub struct FileUiState {
    /// Whether the "Clean Data" section is expanded.
    pub clean_open: bool,
    /// Columns ticked in the drop-columns selector.
    pub drop_selection: BTreeSet<String>,
    pub show_bar: bool,
    pub show_histogram: bool,
    pub format: ExportFormat,
    /// Result of the last "Convert" click, waiting to be saved.
    pub pending_export: Option<ExportBuffer>,
    pub notices: Vec<Notice>,
}

impl FileUiState {
    /// Record a notice, keeping only the latest [`MAX_NOTICES`].
    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
        if self.notices.len() > MAX_NOTICES {
            let excess = self.notices.len() - MAX_NOTICES;
            self.notices.drain(..excess);
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub session: Session,

    /// Widget state keyed like the session.
    pub files: BTreeMap<FileId, FileUiState>,

    /// Files that could not be loaded: (file name, message).
    pub load_errors: Vec<(String, String)>,

    pub preview_rows: usize,

    /// Status line in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: Session::new(),
            files: BTreeMap::new(),
            load_errors: Vec::new(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            status_message: None,
        }
    }
}

impl AppState {
    pub fn with_preview_rows(preview_rows: usize) -> Self {
        Self {
            preview_rows,
            ..Self::default()
        }
    }

    /// Read files from disk and add them to the session.
    pub fn load_paths(&mut self, paths: &[PathBuf]) {
        let mut uploads = Vec::with_capacity(paths.len());
        for path in paths {
            match UploadRecord::from_path(path) {
                Ok(upload) => uploads.push(upload),
                Err(e) => {
                    log::error!("Failed to read {}: {e}", path.display());
                    self.load_errors.push((display_name(path), e.to_string()));
                }
            }
        }
        self.load_uploads(uploads);
    }

    /// Add already-read uploads (file dialog or drag and drop).
    pub fn load_uploads(&mut self, uploads: Vec<UploadRecord>) {
        let mut loaded = 0;
        for (name, result) in self.session.upload_all(uploads) {
            self.load_errors.retain(|(n, _)| *n != name);
            match result {
                Ok(id) => {
                    // a re-upload starts from fresh widget state
                    self.files.insert(id, FileUiState::default());
                    loaded += 1;
                }
                Err(e) => self.load_errors.push((name, e.to_string())),
            }
        }
        self.status_message = Some(format!("{} files loaded", self.session.len()));
        log::info!("{loaded} files loaded, {} errors", self.load_errors.len());
    }

    pub fn ui(&mut self, id: FileId) -> &mut FileUiState {
        self.files.entry(id).or_default()
    }

    /// Run a transform and record the outcome as a notice.
    pub fn apply(&mut self, id: FileId, transform: &Transform) {
        let notice = match self.session.apply(id, transform) {
            Ok(TransformReport::MissingFilled(fill)) if !fill.skipped.is_empty() => {
                Notice::Warning(TransformReport::MissingFilled(fill).to_string())
            }
            Ok(report) => Notice::Success(report.to_string()),
            Err(e) => Notice::Error(e.to_string()),
        };
        let ui = self.ui(id);
        if let Transform::DropColumns(_) = transform {
            ui.drop_selection.clear();
        }
        // the previous export no longer matches the table
        ui.pending_export = None;
        ui.notify(notice);
    }

    /// Drop the columns currently ticked for this file.
    pub fn drop_selected(&mut self, id: FileId) {
        let names: Vec<String> = self.ui(id).drop_selection.iter().cloned().collect();
        self.apply(id, &Transform::DropColumns(names));
    }

    /// Encode the current table in the selected format.
    pub fn convert(&mut self, id: FileId) {
        let format = self.ui(id).format;
        match self.session.export(id, format) {
            Ok(buffer) => {
                let ui = self.ui(id);
                ui.notify(Notice::Success(format!(
                    "Converted to {format}: {}",
                    buffer.file_name
                )));
                ui.pending_export = Some(buffer);
            }
            Err(e) => {
                log::error!("Export failed: {e}");
                let ui = self.ui(id);
                ui.pending_export = None;
                ui.notify(Notice::Error(e.to_string()));
            }
        }
    }

    /// Write the pending export to `path`.
    pub fn save_export(&mut self, id: FileId, path: &Path) {
        let ui = self.ui(id);
        let Some(buffer) = &ui.pending_export else {
            return;
        };
        let notice = match std::fs::write(path, &buffer.bytes) {
            Ok(()) => {
                log::info!("Saved {} ({})", path.display(), buffer.mime);
                Notice::Success(format!("Saved {}", path.display()))
            }
            Err(e) => {
                log::error!("Failed to save {}: {e}", path.display());
                Notice::Error(format!("Failed to save {}: {e}", path.display()))
            }
        };
        ui.notify(notice);
    }

    /// Change the export format. A pending export in the old format is
    /// discarded so Download always matches the selected format.
    pub fn set_format(&mut self, id: FileId, format: ExportFormat) {
        let ui = self.ui(id);
        if ui.format != format {
            ui.format = format;
            ui.pending_export = None;
        }
    }

    pub fn remove_file(&mut self, id: FileId) {
        self.session.remove(id);
        self.files.remove(&id);
    }

    pub fn clear(&mut self) {
        self.session.clear();
        self.files.clear();
        self.load_errors.clear();
        self.status_message = None;
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

use eframe::egui;

use smart_clean::data::UploadRecord;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SmartCleanApp {
    pub state: AppState,
}

impl SmartCleanApp {
    pub fn new(preview_rows: usize) -> Self {
        Self {
            state: AppState::with_preview_rows(preview_rows),
        }
    }

    /// Files dropped onto the window since the last frame.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if dropped.is_empty() {
            return;
        }

        let mut paths = Vec::new();
        let mut uploads = Vec::new();
        for file in dropped {
            if let Some(path) = file.path {
                paths.push(path);
            } else if let Some(bytes) = file.bytes {
                // web drops carry bytes only
                uploads.push(UploadRecord::new(file.name, bytes.to_vec()));
            }
        }
        if !paths.is_empty() {
            self.state.load_paths(&paths);
        }
        if !uploads.is_empty() {
            self.state.load_uploads(uploads);
        }
    }
}

impl eframe::App for SmartCleanApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: title and menu ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: uploads ----
        egui::SidePanel::left("upload_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: one card per file ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, &mut self.state);
        });
    }
}

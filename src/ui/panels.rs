use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use smart_clean::data::loader::SourceFormat;
use smart_clean::data::summary::NO_NUMERIC_WARNING;
use smart_clean::data::{ExportFormat, Table, Transform};
use smart_clean::FileId;

use crate::color;
use crate::state::{AppState, Notice};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title bar with the file menu.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Upload files…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Close all").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.heading(RichText::new("Smart Clean").strong());
        ui.label("Transform your CSV & Excel files with cleaning, visualization, and conversion!");

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(msg);
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – uploads
// ---------------------------------------------------------------------------

/// Render the upload panel: picker button, loaded files, load errors.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📂 Upload Files");
    ui.label("Upload your CSV or Excel files for processing");
    ui.add_space(4.0);
    if ui.button("Browse files…").clicked() {
        open_file_dialog(state);
    }
    ui.small("…or drop them onto the window.");
    ui.separator();

    if state.session.is_empty() {
        ui.label("No files loaded.");
    }

    let mut to_remove = None;
    for (id, file) in state.session.iter() {
        ui.horizontal(|ui: &mut Ui| {
            if ui.small_button("✖").on_hover_text("Remove").clicked() {
                to_remove = Some(id);
            }
            ui.label(&file.upload.name);
        });
    }
    if let Some(id) = to_remove {
        state.remove_file(id);
    }

    if !state.load_errors.is_empty() {
        ui.separator();
        for (name, msg) in &state.load_errors {
            ui.colored_label(color::ERROR, format!("{name}: {msg}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel – one card per file
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.session.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Upload CSV or Excel files to get started  (File → Upload files…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for id in state.session.ids() {
                ui.push_id(id, |ui: &mut Ui| file_card(ui, state, id));
                ui.add_space(16.0);
            }
            if state.load_errors.is_empty() {
                ui.colored_label(color::SUCCESS, "✅ All files processed successfully!");
            }
        });
}

fn file_card(ui: &mut Ui, state: &mut AppState, id: FileId) {
    let Ok(info) = state.session.info(id) else {
        return;
    };

    egui::Frame::group(ui.style())
        .stroke(egui::Stroke::new(2.0, color::ACCENT_BLUE))
        .show(ui, |ui: &mut Ui| {
            ui.heading(format!("📂 {}", info.name));
            ui.label(format!(
                "🔹 Rows: {} | 🔹 Columns: {} | 🔹 File Size: {} KB",
                info.rows, info.columns, info.size_kb
            ));
        });

    if let Ok(preview) = state.session.preview(id, state.preview_rows) {
        preview_table(ui, &preview);
    }

    cleaning_section(ui, state, id);
    visualization_section(ui, state, id);
    conversion_section(ui, state, id);
    notices(ui, state, id);
}

/// The first rows of the table in a striped grid.
fn preview_table(ui: &mut Ui, table: &Table) {
    if table.width() == 0 {
        ui.weak("(no columns)");
        return;
    }
    ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .columns(TableColumn::auto().at_least(60.0), table.width())
                .header(20.0, |mut header| {
                    for col in table.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(&col.name).on_hover_text(col.kind.to_string());
                        });
                    }
                })
                .body(|mut body| {
                    for row in table.rows() {
                        body.row(18.0, |mut table_row| {
                            for value in row {
                                table_row.col(|ui: &mut Ui| {
                                    if value.is_missing() {
                                        ui.weak("NaN");
                                    } else {
                                        ui.label(value.to_string());
                                    }
                                });
                            }
                        });
                    }
                });
        });
}

fn cleaning_section(ui: &mut Ui, state: &mut AppState, id: FileId) {
    ui.add_space(8.0);
    ui.strong("🧹 Data Cleaning");

    let Ok(table) = state.session.table(id) else {
        return;
    };
    let names: Vec<String> = table.column_names().into_iter().map(str::to_string).collect();

    let ui_state = state.ui(id);
    ui.checkbox(&mut ui_state.clean_open, "Clean Data");
    if !ui_state.clean_open {
        return;
    }

    let mut action = None;
    let mut drop_selected = false;
    ui.columns(3, |cols: &mut [Ui]| {
        if cols[0].button("Remove Duplicates").clicked() {
            action = Some(Transform::Deduplicate);
        }

        cols[1].label("Select columns to drop");
        for name in &names {
            let mut ticked = ui_state.drop_selection.contains(name);
            if cols[1].checkbox(&mut ticked, name).changed() {
                if ticked {
                    ui_state.drop_selection.insert(name.clone());
                } else {
                    ui_state.drop_selection.remove(name);
                }
            }
        }
        drop_selected = cols[1]
            .add_enabled(!ui_state.drop_selection.is_empty(), egui::Button::new("Drop Columns"))
            .clicked();

        if cols[2].button("Fill Missing Values").clicked() {
            action = Some(Transform::FillMissing);
        }
    });

    if let Some(transform) = action {
        state.apply(id, &transform);
    }
    if drop_selected {
        state.drop_selected(id);
    }
}

fn visualization_section(ui: &mut Ui, state: &mut AppState, id: FileId) {
    ui.add_space(8.0);
    ui.strong("📊 Data Visualization");

    let charts = match state.session.chart_data(id) {
        Ok(Some(charts)) => charts,
        Ok(None) => {
            ui.colored_label(color::WARNING, NO_NUMERIC_WARNING);
            return;
        }
        Err(e) => {
            ui.colored_label(color::ERROR, e.to_string());
            return;
        }
    };

    let ui_state = state.ui(id);
    ui.horizontal(|ui: &mut Ui| {
        ui.checkbox(&mut ui_state.show_bar, "📊 Show Bar Chart");
        ui.checkbox(&mut ui_state.show_histogram, "📊 Show Histogram");
    });
    if ui_state.show_bar {
        ui.label(RichText::new("📉 Bar Chart").strong());
        plot::bar_chart(ui, id, &charts.bar);
    }
    if ui_state.show_histogram {
        ui.label(RichText::new("📊 Histogram").strong());
        plot::histograms(ui, id, &charts.histograms);
    }
}

fn conversion_section(ui: &mut Ui, state: &mut AppState, id: FileId) {
    ui.add_space(8.0);
    ui.strong("🔄 Convert & Download");

    let mut format = state.ui(id).format;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Convert to:");
        for option in ExportFormat::ALL {
            ui.radio_value(&mut format, option, option.label());
        }
    });
    state.set_format(id, format);

    let ui_state = state.ui(id);
    let mut convert = false;
    let mut download = None;
    ui.horizontal(|ui: &mut Ui| {
        convert = ui.button("Convert").clicked();
        if let Some(buffer) = &ui_state.pending_export {
            if ui
                .button(format!("📥 Download as {}", format.label()))
                .on_hover_text(buffer.mime)
                .clicked()
            {
                download = save_file_dialog(&buffer.file_name, format);
            }
        }
    });

    if convert {
        state.convert(id);
    }
    if let Some(path) = download {
        state.save_export(id, &path);
    }
}

fn notices(ui: &mut Ui, state: &AppState, id: FileId) {
    let Some(ui_state) = state.files.get(&id) else {
        return;
    };
    for notice in ui_state.notices.iter().rev().take(3) {
        let (colour, text): (Color32, String) = match notice {
            Notice::Success(msg) => (color::SUCCESS, format!("✅ {msg}")),
            Notice::Warning(msg) => (color::WARNING, format!("⚠ {msg}")),
            Notice::Error(msg) => (color::ERROR, format!("❌ {msg}")),
        };
        ui.colored_label(colour, text);
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Upload files")
        .add_filter("CSV & Excel", &SourceFormat::EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_files();

    if let Some(paths) = files {
        state.load_paths(&paths);
    }
}

fn save_file_dialog(file_name: &str, format: ExportFormat) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Download")
        .set_file_name(file_name)
        .add_filter(format.label(), &[format.extension()])
        .save_file()
}

mod app;
mod cli;
mod color;
mod state;
mod ui;

use anyhow::anyhow;
use app::SmartCleanApp;
use clap::Parser;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = cli::Cli::parse();
    if let Some(command) = cli.command {
        return cli::run_command(command, cli.preview_rows);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let preview_rows = cli.preview_rows;
    eframe::run_native(
        "Smart Clean",
        options,
        Box::new(move |_cc| Ok(Box::new(SmartCleanApp::new(preview_rows)))),
    )
    .map_err(|e| anyhow!("{e}"))
}

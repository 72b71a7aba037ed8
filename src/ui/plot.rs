use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use smart_clean::data::summary::{BarSeries, Histogram};
use smart_clean::FileId;

use crate::color;

const CHART_HEIGHT: f32 = 220.0;
const HISTOGRAM_HEIGHT: f32 = 160.0;

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

/// Grouped bars: one group per row, one bar per series.
pub fn bar_chart(ui: &mut Ui, id: FileId, series: &[BarSeries]) {
    let n = series.len().max(1) as f64;
    let bar_width = 0.8 / n;

    let charts: Vec<BarChart> = series
        .iter()
        .enumerate()
        .map(|(k, s)| {
            let offset = (k as f64 - (n - 1.0) / 2.0) * bar_width;
            let bars: Vec<Bar> = s
                .values
                .iter()
                .enumerate()
                .filter_map(|(row, v)| {
                    v.map(|y| Bar::new(row as f64 + offset, y).width(bar_width))
                })
                .collect();
            BarChart::new(bars).name(&s.name).color(color::bar_color(k))
        })
        .collect();

    Plot::new(format!("bar_chart_{id}"))
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Index")
        .y_axis_label("Values")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Histograms
// ---------------------------------------------------------------------------

/// One small histogram per numeric column, wrapped across the available width.
pub fn histograms(ui: &mut Ui, id: FileId, histograms: &[Histogram]) {
    let palette = color::histogram_palette(histograms.len());
    let plot_width = (ui.available_width() / 2.0 - 8.0).max(200.0);

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (h, fill) in histograms.iter().zip(palette) {
            ui.vertical(|ui: &mut Ui| {
                ui.set_width(plot_width);
                ui.label(&h.column);
                if h.bins.is_empty() {
                    ui.weak("no values");
                    return;
                }
                let bars: Vec<Bar> = h
                    .bins
                    .iter()
                    .map(|b| {
                        Bar::new(b.center(), b.count as f64)
                            .width(b.width())
                            .stroke(Stroke::new(1.0, Color32::BLACK))
                    })
                    .collect();
                let chart = BarChart::new(bars).name(&h.column).color(fill);

                Plot::new(format!("histogram_{id}_{}", h.column))
                    .height(HISTOGRAM_HEIGHT)
                    .width(plot_width)
                    .allow_scroll(false)
                    .show(ui, |plot_ui| plot_ui.bar_chart(chart));
            });
        }
    });
}

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Chart colours
// ---------------------------------------------------------------------------

/// Bar series colours (blue, red).
pub const BAR_COLORS: [Color32; 2] = [
    Color32::from_rgb(0x34, 0x98, 0xdb),
    Color32::from_rgb(0xe7, 0x4c, 0x3c),
];

/// Histogram fill for a single column.
pub const HISTOGRAM_GREEN: Color32 = Color32::from_rgb(0x2e, 0xcc, 0x71);

/// Card accent used for the file info box.
pub const ACCENT_BLUE: Color32 = BAR_COLORS[0];

pub const SUCCESS: Color32 = Color32::from_rgb(0x27, 0xae, 0x60);
pub const WARNING: Color32 = Color32::from_rgb(0xf3, 0x9c, 0x12);
pub const ERROR: Color32 = Color32::from_rgb(0xc0, 0x39, 0x2b);

/// Colour for the `i`-th bar series, falling back to a generated hue.
pub fn bar_color(i: usize) -> Color32 {
    BAR_COLORS.get(i).copied().unwrap_or_else(|| hue_color(i as f32 * 47.0))
}

/// One fill per histogram, starting at the base green and rotating the hue so
/// neighbouring columns stay distinguishable.
pub fn histogram_palette(n: usize) -> Vec<Color32> {
    match n {
        0 => Vec::new(),
        1 => vec![HISTOGRAM_GREEN],
        _ => (0..n)
            .map(|i| hue_color(145.0 + (i as f32 / n as f32) * 360.0))
            .collect(),
    }
}

fn hue_color(hue: f32) -> Color32 {
    let hsl = Hsl::new(hue % 360.0, 0.63, 0.49);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_sizes() {
        assert!(histogram_palette(0).is_empty());
        assert_eq!(histogram_palette(1), vec![HISTOGRAM_GREEN]);
        let colors = histogram_palette(4);
        assert_eq!(colors.len(), 4);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn first_bars_use_fixed_colors() {
        assert_eq!(bar_color(0), BAR_COLORS[0]);
        assert_eq!(bar_color(1), BAR_COLORS[1]);
    }
}

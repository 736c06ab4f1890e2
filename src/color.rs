use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use rusty_lightcurves::data::schema::ColumnSchema;

/// Colour of the object of interest; references get palette colours.
pub const OBJECT_COLOR: Color32 = Color32::from_rgb(255, 200, 40);

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// `n` distinct colours with evenly spaced hues. The yellow band is left out
/// so references never look like the object.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = 70.0 + (i as f32 / n as f32) * 320.0;
            let hsl = Hsl::new(hue % 360.0, 0.70, 0.58);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Star colours
// ---------------------------------------------------------------------------

/// Colour per star index, stable across filter bands.
#[derive(Debug, Clone)]
pub struct StarColors {
    colors: Vec<Color32>,
    labels: Vec<String>,
}

impl StarColors {
    pub fn new(schema: &ColumnSchema) -> Self {
        let n = schema.star_count();
        let mut colors = Vec::with_capacity(n);
        if n > 0 {
            colors.push(OBJECT_COLOR);
            colors.extend(generate_palette(n - 1));
        }
        let labels = (0..n).map(|s| schema.label(s).to_string()).collect();
        StarColors { colors, labels }
    }

    pub fn color_for(&self, star: usize) -> Color32 {
        self.colors.get(star).copied().unwrap_or(Color32::GRAY)
    }

    /// Legend entries (identifier → colour), object first.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.labels
            .iter()
            .cloned()
            .zip(self.colors.iter().copied())
            .collect()
    }
}

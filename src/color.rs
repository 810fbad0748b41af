use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Hue mapping: group key → Color32
// ---------------------------------------------------------------------------

/// Maps the group keys of a line panel (day, month, year) to distinct colours.
#[derive(Debug, Clone)]
pub struct HueMap {
    mapping: BTreeMap<i64, Color32>,
    default_color: Color32,
}

impl HueMap {
    pub fn new(keys: impl IntoIterator<Item = i64>) -> Self {
        let keys: Vec<i64> = keys.into_iter().collect();
        let palette = generate_palette(keys.len());
        HueMap {
            mapping: keys.into_iter().zip(palette).collect(),
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, key: i64) -> Color32 {
        self.mapping
            .get(&key)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Diverging map for the correlation heatmap
// ---------------------------------------------------------------------------

const COOL: (f32, f32, f32) = (0.230, 0.299, 0.754);
const NEUTRAL: (f32, f32, f32) = (0.865, 0.865, 0.865);
const WARM: (f32, f32, f32) = (0.706, 0.016, 0.150);

fn linear((r, g, b): (f32, f32, f32)) -> LinSrgb {
    Srgb::new(r, g, b).into_linear()
}

/// Blue → grey → red for a coefficient in [-1, 1]; values outside are clamped.
pub fn coolwarm(value: f64) -> Color32 {
    let t = ((value.clamp(-1.0, 1.0) + 1.0) / 2.0) as f32;
    let mixed = if t < 0.5 {
        linear(COOL).mix(linear(NEUTRAL), t * 2.0)
    } else {
        linear(NEUTRAL).mix(linear(WARM), (t - 0.5) * 2.0)
    };
    to_color32(Srgb::from_linear(mixed))
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 150.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

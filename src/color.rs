use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

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
            let hsl = Hsl::new(hue, 0.65, 0.55);
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
// Category colours: group label → Color32
// ---------------------------------------------------------------------------

/// Stable colours for the categories of a chart, assigned in label order.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<&str> = labels.into_iter().collect();
        let palette = generate_palette(labels.len());
        CategoryColors {
            mapping: labels
                .into_iter()
                .zip(palette)
                .map(|(l, c)| (l.to_string(), c))
                .collect(),
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

/// Red used for at-risk rows and error text.
pub const RISK_COLOR: Color32 = Color32::from_rgb(220, 80, 60);

/// Diverging fill for a correlation coefficient: blue for positive, red for
/// negative, paler towards zero.
pub fn correlation_color(r: f64) -> Color32 {
    let strength = r.abs().clamp(0.0, 1.0) as f32;
    let hue = if r >= 0.0 { 210.0 } else { 5.0 };
    let hsl = Hsl::new(hue, 0.7, 0.95 - 0.45 * strength);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_category_is_gray() {
        let colors = CategoryColors::new(["Business", "Nursing"]);
        assert_ne!(colors.color_for("Business"), colors.color_for("Nursing"));
        assert_eq!(colors.color_for("Law"), Color32::GRAY);
    }

    #[test]
    fn correlation_colours_diverge_and_fade() {
        let strong_pos = correlation_color(0.9);
        let strong_neg = correlation_color(-0.9);
        assert!(strong_pos.b() > strong_pos.r());
        assert!(strong_neg.r() > strong_neg.b());
        // Near zero both sides are almost white.
        let faint = correlation_color(0.0);
        assert!(faint.r() > 230 && faint.g() > 230 && faint.b() > 230);
    }
}

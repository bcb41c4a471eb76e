use serde::{Serialize, Serializer};
use std::fmt;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Linear interpolation between two colors, `t` clamped to [0, 1].
    pub fn lerp(from: Color, to: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;

        Color::rgba(
            mix(from.r, to.r),
            mix(from.g, to.g),
            mix(from.b, to.b),
            mix(from.a, to.a),
        )
    }

    /// `#rrggbb`, alpha dropped.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(&self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// How a single value is drawn: a fill color and, for point symbols, a radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualEncoding {
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
}

impl VisualEncoding {
    pub const fn fill(color: Color) -> Self {
        Self {
            color,
            radius: None,
        }
    }

    pub const fn marker(color: Color, radius: u32) -> Self {
        Self {
            color,
            radius: Some(radius),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Swatch {
    /// A color stop on a continuous ramp.
    Ramp { color: Color },
    /// A filled circle of the given marker radius.
    Circle { color: Color, radius: u32 },
}

impl Swatch {
    pub fn color(&self) -> Color {
        match self {
            Swatch::Ramp { color } | Swatch::Circle { color, .. } => *color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub swatch: Swatch,
    /// Numeric bin boundary this entry stands for; `None` for a catch-all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub caption: String,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    pub fn thresholds(&self) -> Vec<f64> {
        self.entries.iter().filter_map(|e| e.threshold).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(Color::rgb(0xfc, 0xc5, 0xc0).to_hex(), "#fcc5c0");
        assert_eq!(Color::BLUE.to_string(), "#0000ff");
    }

    #[test]
    fn test_lerp_clamps() {
        assert_eq!(Color::lerp(Color::WHITE, Color::BLUE, -1.0), Color::WHITE);
        assert_eq!(Color::lerp(Color::WHITE, Color::BLUE, 2.0), Color::BLUE);
        assert_eq!(
            Color::lerp(Color::WHITE, Color::BLUE, 0.5),
            Color::rgb(128, 128, 255)
        );
    }
}

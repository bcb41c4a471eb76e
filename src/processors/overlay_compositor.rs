use crate::error::{MapError, Result};
use crate::models::{ComparisonArtifact, DayOffset, OverlayArtifact, RasterTile, Variable};
use crate::processors::classifier::{ramp_color, Scheme};
use crate::processors::legend_builder::build_legend;
use crate::readers::TileStore;
use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// How grid values become overlay pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayStyle {
    /// Solid blue whose alpha is the value over the tile's own maximum.
    /// The legend shows a white to blue ramp, so the two do not match.
    #[default]
    Opacity,
    /// Each pixel painted with the legend's own ramp color.
    Ramp,
}

/// Colorize a tile into a georeferenced RGBA layer. No-data cells are
/// fully transparent in both styles.
pub fn compose(tile: &RasterTile, style: OverlayStyle) -> Result<OverlayArtifact> {
    let variable = tile.key.variable;
    let width = tile.grid.cols();
    let height = tile.grid.rows();
    let peak = tile.grid.finite_range().map(|(_, hi)| hi as f64);
    let mut pixels = vec![0u8; width * height * 4];

    pixels
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(row, out)| {
            for (value, px) in tile.grid.row(row).iter().zip(out.chunks_exact_mut(4)) {
                px.copy_from_slice(&pixel(variable, *value as f64, peak, style));
            }
        });

    let image = RgbaImage::from_raw(width as u32, height as u32, pixels).ok_or_else(|| {
        MapError::Render(format!("Pixel buffer does not fit {}x{}", width, height))
    })?;

    Ok(OverlayArtifact {
        variable,
        day: tile.key.day,
        image,
        bounds: tile.bounds,
    })
}

fn pixel(variable: Variable, value: f64, peak: Option<f64>, style: OverlayStyle) -> [u8; 4] {
    if !value.is_finite() {
        return [0, 0, 0, 0];
    }

    match style {
        OverlayStyle::Opacity => [0, 0, 255, opacity(value, peak)],
        OverlayStyle::Ramp => ramp_color(variable, value).to_rgba().0,
    }
}

/// Alpha of `value` scaled so the tile maximum is opaque. Tiles whose
/// maximum is not positive draw nothing.
fn opacity(value: f64, peak: Option<f64>) -> u8 {
    match peak {
        Some(peak) if peak > 0.0 => ((value / peak).clamp(0.0, 1.0) * 255.0).round() as u8,
        _ => 0,
    }
}

/// Resolve and compose a single day. A missing or broken tile is an
/// error, never a blank layer.
pub fn overlay_for_day(
    store: &dyn TileStore,
    variable: Variable,
    day: DayOffset,
    style: OverlayStyle,
) -> Result<OverlayArtifact> {
    let tile = store.resolve(variable, day)?;
    let overlay = compose(&tile, style)?;
    tracing::debug!(
        "Composed {} day {} overlay {}x{}",
        variable,
        day,
        overlay.image.width(),
        overlay.image.height()
    );
    Ok(overlay)
}

/// Two overlays of one variable, each with its own bounds, sharing one legend.
pub fn compare(
    store: &dyn TileStore,
    variable: Variable,
    first: DayOffset,
    second: DayOffset,
    style: OverlayStyle,
) -> Result<ComparisonArtifact> {
    let left = overlay_for_day(store, variable, first, style)?;
    let right = overlay_for_day(store, variable, second, style)?;

    Ok(ComparisonArtifact {
        left,
        right,
        legend: build_legend(Scheme::RasterRamp(variable)),
    })
}

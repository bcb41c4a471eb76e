//! Static per-day frames for the timelapse, drawn with plotters into an
//! in-memory RGB buffer.
//!
//! Titles, axis descriptions and tick labels need the `fonts` feature.
//! Without it plotters only has a fallback font that cannot draw glyphs,
//! so frames carry the plot, an outline and the colorbar and no text.

use crate::error::{MapError, Result};
use crate::models::{Color as MapColor, RasterTile, Variable};
use crate::utils::constants::{
    COLORBAR_STEPS, COLORBAR_WIDTH, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH,
};
use image::{DynamicImage, RgbImage, RgbaImage};
use plotters::prelude::*;

pub(crate) const DRAW_TEXT: bool = cfg!(feature = "fonts");

/// Turns one resolved tile into one still image.
pub trait FrameRenderer {
    fn render_frame(&self, tile: &RasterTile) -> Result<RgbaImage>;
}

/// Title shown above each frame, e.g. `Temperature - Day -3`.
pub fn frame_title(tile: &RasterTile) -> String {
    format!("{} - Day {}", tile.key.variable.display_name(), tile.key.day)
}

/// Light, middle and dark stops of a variable's frame palette.
fn palette(variable: Variable) -> [MapColor; 3] {
    match variable {
        Variable::Precipitation => [
            MapColor::rgb(247, 251, 255),
            MapColor::rgb(107, 174, 214),
            MapColor::rgb(8, 48, 107),
        ],
        Variable::Temperature => [
            MapColor::rgb(255, 245, 240),
            MapColor::rgb(251, 106, 74),
            MapColor::rgb(103, 0, 13),
        ],
        Variable::Humidity => [
            MapColor::rgb(247, 252, 245),
            MapColor::rgb(116, 196, 118),
            MapColor::rgb(0, 68, 27),
        ],
    }
}

/// Value range the frame palette spans.
pub fn frame_domain(variable: Variable) -> (f64, f64) {
    match variable {
        Variable::Precipitation => (1.0, 100.0),
        Variable::Temperature => (0.0, 20.0),
        Variable::Humidity => (0.0, 50.0),
    }
}

/// Frame color of `value`, clamped to the frame domain.
pub fn frame_color(variable: Variable, value: f64) -> MapColor {
    let (min, max) = frame_domain(variable);
    let t = ((value - min) / (max - min)).clamp(0.0, 1.0);
    let [light, middle, dark] = palette(variable);
    if t < 0.5 {
        MapColor::lerp(light, middle, t * 2.0)
    } else {
        MapColor::lerp(middle, dark, (t - 0.5) * 2.0)
    }
}

/// Raster plot with longitude/latitude axes and a colorbar on the right.
#[derive(Debug, Clone)]
pub struct PlotFrameRenderer {
    width: u32,
    height: u32,
    /// Upper bound on cells drawn per axis; larger grids are strided.
    max_cells: usize,
}

impl PlotFrameRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(COLORBAR_WIDTH * 2),
            height: height.max(100),
            max_cells: 400,
        }
    }

    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells.max(1);
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn draw(&self, tile: &RasterTile, buffer: &mut [u8]) -> Result<()> {
        let variable = tile.key.variable;
        let bounds = tile.bounds;
        let grid = &tile.grid;

        let root = BitMapBackend::with_buffer(buffer, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        let (plot_area, bar_area) = root.split_horizontally((self.width - COLORBAR_WIDTH) as i32);

        let mut builder = ChartBuilder::on(&plot_area);
        builder.margin(10);
        if DRAW_TEXT {
            builder
                .caption(frame_title(tile), ("sans-serif", 22))
                .x_label_area_size(40)
                .y_label_area_size(50);
        }
        let mut chart = builder
            .build_cartesian_2d(bounds.left..bounds.right, bounds.bottom..bounds.top)
            .map_err(render_err)?;

        if DRAW_TEXT {
            chart
                .configure_mesh()
                .disable_mesh()
                .x_desc("Longitude")
                .y_desc("Latitude")
                .draw()
                .map_err(render_err)?;
        }

        let row_stride = stride(grid.rows(), self.max_cells);
        let col_stride = stride(grid.cols(), self.max_cells);
        let cell_w = bounds.width() / grid.cols() as f64;
        let cell_h = bounds.height() / grid.rows() as f64;

        let cells = (0..grid.rows()).step_by(row_stride).flat_map(move |row| {
            (0..grid.cols())
                .step_by(col_stride)
                .filter_map(move |col| {
                    let value = grid.get(row, col)? as f64;
                    if !value.is_finite() {
                        return None;
                    }
                    let x0 = bounds.left + col as f64 * cell_w;
                    let y0 = bounds.top - row as f64 * cell_h;
                    let x1 = (x0 + col_stride as f64 * cell_w).min(bounds.right);
                    let y1 = (y0 - row_stride as f64 * cell_h).max(bounds.bottom);
                    Some(Rectangle::new(
                        [(x0, y0), (x1, y1)],
                        plot_color(variable, value).filled(),
                    ))
                })
        });
        chart.draw_series(cells).map_err(render_err)?;

        let outline = vec![
            (bounds.left, bounds.bottom),
            (bounds.left, bounds.top),
            (bounds.right, bounds.top),
            (bounds.right, bounds.bottom),
            (bounds.left, bounds.bottom),
        ];
        chart
            .draw_series(std::iter::once(PathElement::new(outline, BLACK)))
            .map_err(render_err)?;

        draw_colorbar(&bar_area, variable)?;
        root.present().map_err(render_err)?;
        Ok(())
    }
}

impl Default for PlotFrameRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT)
    }
}

impl FrameRenderer for PlotFrameRenderer {
    fn render_frame(&self, tile: &RasterTile) -> Result<RgbaImage> {
        let mut buffer = vec![0u8; rgb_buffer_len(self.width, self.height)];
        self.draw(tile, &mut buffer)?;

        let rgb = RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            MapError::Render(format!(
                "Frame buffer does not fit {}x{}",
                self.width, self.height
            ))
        })?;
        Ok(DynamicImage::ImageRgb8(rgb).to_rgba8())
    }
}

/// Bytes of an RGB buffer, counted in `usize`.
pub(crate) fn rgb_buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    variable: Variable,
) -> Result<()> {
    let (min, max) = frame_domain(variable);

    let mut builder = ChartBuilder::on(area);
    builder.margin_top(50).margin_bottom(50).margin_right(10);
    if DRAW_TEXT {
        builder.y_label_area_size(50);
    } else {
        builder.margin_left(30);
    }
    let mut bar = builder
        .build_cartesian_2d(0.0..1.0, min..max)
        .map_err(render_err)?;

    if DRAW_TEXT {
        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_desc(variable.unit())
            .draw()
            .map_err(render_err)?;
    }

    let step = (max - min) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let low = min + i as f64 * step;
        Rectangle::new(
            [(0.0, low), (1.0, low + step)],
            plot_color(variable, low + step / 2.0).filled(),
        )
    }))
    .map_err(render_err)?;

    Ok(())
}

/// Cells per drawn rectangle so that at most `max_cells` are drawn.
fn stride(cells: usize, max_cells: usize) -> usize {
    ((cells + max_cells - 1) / max_cells).max(1)
}

fn plot_color(variable: Variable, value: f64) -> RGBColor {
    let color = frame_color(variable, value);
    RGBColor(color.r, color.g, color.b)
}

fn render_err<E: std::fmt::Display>(e: E) -> MapError {
    MapError::Render(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayOffset, Grid, TileKey};
    use crate::test_support::{morocco_bounds, sample_tile};

    #[test]
    fn test_frame_title() {
        let tile = sample_tile(Variable::Temperature, -3);
        assert_eq!(frame_title(&tile), "Temperature - Day -3");
    }

    #[test]
    fn test_frame_dimensions() -> Result<()> {
        let renderer = PlotFrameRenderer::new(320, 240);
        let frame = renderer.render_frame(&sample_tile(Variable::Humidity, 0))?;
        assert_eq!(frame.dimensions(), (320, 240));
        assert!(frame.pixels().all(|p| p.0[3] == 255));
        Ok(())
    }

    #[test]
    fn test_frame_paints_cells() -> Result<()> {
        let tile = RasterTile::new(
            TileKey::new(Variable::Precipitation, DayOffset::current()),
            Grid::new(1, 1, vec![100.0])?,
            morocco_bounds(),
        )?;
        let frame = PlotFrameRenderer::new(400, 300).render_frame(&tile)?;

        // A single saturated cell covers the middle of the plot area.
        let center = frame.get_pixel(140, 150).0;
        assert_eq!(&center[..3], &[8, 48, 107]);
        Ok(())
    }

    #[test]
    fn test_large_grids_are_strided() -> Result<()> {
        let tile = RasterTile::new(
            TileKey::new(Variable::Temperature, DayOffset::current()),
            Grid::new(60, 90, vec![12.0; 60 * 90])?,
            morocco_bounds(),
        )?;
        let renderer = PlotFrameRenderer::new(300, 200).with_max_cells(10);
        let frame = renderer.render_frame(&tile)?;
        assert_eq!(frame.dimensions(), (300, 200));
        Ok(())
    }

    #[test]
    fn test_frame_palettes_follow_variable_hue() {
        let hot = frame_color(Variable::Temperature, 20.0);
        assert_eq!(hot, MapColor::rgb(103, 0, 13));
        let wet = frame_color(Variable::Humidity, 50.0);
        assert_eq!(wet, MapColor::rgb(0, 68, 27));

        // Precipitation starts at 1 mm; anything below is the lightest shade.
        assert_eq!(
            frame_color(Variable::Precipitation, 0.0),
            frame_color(Variable::Precipitation, 1.0)
        );
        assert_eq!(
            frame_color(Variable::Temperature, 10.0),
            MapColor::rgb(251, 106, 74)
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_buffer_length_does_not_overflow() {
        assert_eq!(rgb_buffer_len(40_000, 40_000), 4_800_000_000);
    }
}

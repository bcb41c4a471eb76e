use crate::error::{MapError, Result};
use crate::models::{DayOffset, StationRecord, Variable};
use crate::processors::frame_plotter::{rgb_buffer_len, DRAW_TEXT};
use crate::utils::constants::{CHART_HEIGHT, CHART_WIDTH};
use image::{DynamicImage, RgbImage, RgbaImage};
use plotters::prelude::*;

pub const CHART_TITLE: &str = "Temporal evolution of temperature, humidity and precipitation";

/// One station's week as three line series over J-6..J0.
#[derive(Debug, Clone)]
pub struct StationChart {
    width: u32,
    height: u32,
}

impl StationChart {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(100),
            height: height.max(100),
        }
    }

    pub fn render(&self, record: &StationRecord) -> Result<RgbaImage> {
        let series: Vec<(Variable, Vec<(i32, f64)>)> = [
            Variable::Temperature,
            Variable::Humidity,
            Variable::Precipitation,
        ]
        .into_iter()
        .map(|variable| (variable, points(record, variable)))
        .collect();

        let (low, high) = value_range(series.iter().flat_map(|(_, pts)| pts.iter().map(|p| p.1)))
            .ok_or_else(|| {
                MapError::Render(format!("Station {} has no values to chart", record.id))
            })?;

        let mut buffer = vec![0u8; rgb_buffer_len(self.width, self.height)];
        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;

            let mut builder = ChartBuilder::on(&root);
            builder.margin(10);
            if DRAW_TEXT {
                builder
                    .caption(CHART_TITLE, ("sans-serif", 16))
                    .x_label_area_size(35)
                    .y_label_area_size(45);
            }
            let mut chart = builder
                .build_cartesian_2d(DayOffset::OLDEST..DayOffset::CURRENT, low..high)
                .map_err(render_err)?;

            if DRAW_TEXT {
                chart
                    .configure_mesh()
                    .x_desc("Day")
                    .y_desc("Value")
                    .x_label_formatter(&|d| format!("J{}", d))
                    .draw()
                    .map_err(render_err)?;
            } else {
                let outline = vec![
                    (DayOffset::OLDEST, low),
                    (DayOffset::OLDEST, high),
                    (DayOffset::CURRENT, high),
                    (DayOffset::CURRENT, low),
                    (DayOffset::OLDEST, low),
                ];
                chart
                    .draw_series(std::iter::once(PathElement::new(outline, BLACK)))
                    .map_err(render_err)?;
            }

            for (variable, pts) in series {
                let color = series_color(variable);
                chart
                    .draw_series(LineSeries::new(pts, color.stroke_width(2)))
                    .map_err(render_err)?
                    .label(format!("{} ({})", variable.display_name(), variable.unit()))
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
            }

            if DRAW_TEXT {
                chart
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()
                    .map_err(render_err)?;
            }

            root.present().map_err(render_err)?;
        }

        let rgb = RgbImage::from_raw(self.width, self.height, buffer)
            .ok_or_else(|| MapError::Render("Chart buffer size mismatch".to_string()))?;
        Ok(DynamicImage::ImageRgb8(rgb).to_rgba8())
    }
}

impl Default for StationChart {
    fn default() -> Self {
        Self::new(CHART_WIDTH, CHART_HEIGHT)
    }
}

/// Finite (day, value) points of a variable's week.
fn points(record: &StationRecord, variable: Variable) -> Vec<(i32, f64)> {
    DayOffset::window()
        .map(|day| (day.value(), record.daily_value(variable, day)))
        .filter(|(_, v)| v.is_finite())
        .collect()
}

/// Padded value range; `None` when there is nothing to plot.
fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    let pad = ((hi - lo) * 0.1).max(1.0);
    Some((lo - pad, hi + pad))
}

fn series_color(variable: Variable) -> RGBColor {
    match variable {
        Variable::Temperature => RED,
        Variable::Humidity => RGBColor(0, 128, 0),
        Variable::Precipitation => BLUE,
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> MapError {
    MapError::Render(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_record;

    #[test]
    fn test_renders_station_week() -> Result<()> {
        let image = StationChart::new(300, 200).render(&sample_record())?;
        assert_eq!(image.dimensions(), (300, 200));
        // Something besides the white background got drawn.
        assert!(image.pixels().any(|p| p.0[..3] != [255, 255, 255]));
        Ok(())
    }

    #[test]
    fn test_missing_days_are_dropped() {
        let mut record = sample_record();
        record.humidity[2] = f64::NAN;
        let pts = points(&record, Variable::Humidity);
        assert_eq!(pts.len(), 6);
        assert!(pts.iter().all(|(d, _)| *d != -4));
    }

    #[test]
    fn test_empty_station_is_an_error() {
        let mut record = sample_record();
        record.temperature = [f64::NAN; 7];
        record.humidity = [f64::NAN; 7];
        record.precipitation = [f64::NAN; 7];
        assert!(matches!(
            StationChart::default().render(&record),
            Err(MapError::Render(_))
        ));
    }

    #[test]
    fn test_value_range_padding() {
        assert_eq!(value_range([5.0, 5.0].into_iter()), Some((4.0, 6.0)));
        assert_eq!(value_range(std::iter::empty()), None);
    }
}

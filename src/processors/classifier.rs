use crate::error::{MapError, Result};
use crate::models::{Color, MeanAttribute, Variable, VisualEncoding};
use crate::processors::bin_table::{self, BinTable, RAMP_HIGH, RAMP_LOW};
use std::fmt;

/// Which value-to-visual rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Continuous white to blue ramp over the variable's fixed domain.
    RasterRamp(Variable),
    /// Per-station daily value: fixed hue, radius 1 to 4.
    DailyMarker(Variable),
    /// Per-station weekly mean: discrete palette, radius 5.
    MeanAttribute(MeanAttribute),
}

impl Scheme {
    /// Discrete table behind this scheme; `None` for the continuous ramp.
    pub fn bin_table(&self) -> Option<BinTable> {
        match self {
            Scheme::RasterRamp(_) => None,
            Scheme::DailyMarker(variable) => Some(bin_table::daily_table(*variable)),
            Scheme::MeanAttribute(attribute) => Some(bin_table::mean_table(*attribute)),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::RasterRamp(v) => write!(f, "raster ramp ({})", v),
            Scheme::DailyMarker(v) => write!(f, "daily marker ({})", v),
            Scheme::MeanAttribute(a) => write!(f, "mean attribute ({})", a),
        }
    }
}

/// Map a value to its visual encoding. Pure; NaN and infinities are errors.
pub fn classify(scheme: Scheme, value: f64) -> Result<VisualEncoding> {
    if !value.is_finite() {
        return Err(MapError::Classification {
            scheme: scheme.to_string(),
            value,
        });
    }

    Ok(match scheme {
        Scheme::RasterRamp(variable) => VisualEncoding::fill(ramp_color(variable, value)),
        Scheme::DailyMarker(variable) => bin_table::daily_table(variable).lookup(value),
        Scheme::MeanAttribute(attribute) => bin_table::mean_table(attribute).lookup(value),
    })
}

/// Position of `value` inside the variable's domain, clamped to [0, 1].
pub fn ramp_position(variable: Variable, value: f64) -> f64 {
    let (min, max) = bin_table::domain(variable);
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

pub fn ramp_color(variable: Variable, value: f64) -> Color {
    Color::lerp(RAMP_LOW, RAMP_HIGH, ramp_position(variable, value))
}

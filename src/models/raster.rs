use crate::error::{MapError, Result};
use crate::models::variable::TileKey;
use serde::{Deserialize, Serialize};

/// Geographic extent of a tile in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub bottom: f64,
    pub left: f64,
    pub top: f64,
    pub right: f64,
}

impl Bounds {
    pub fn new(bottom: f64, left: f64, top: f64, right: f64) -> Self {
        Self {
            bottom,
            left,
            top,
            right,
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.bottom, self.left, self.top, self.right]
            .iter()
            .all(|v| v.is_finite())
            && self.bottom < self.top
            && self.left < self.right
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Corner pairs as a map canvas expects them: `[[bottom, left], [top, right]]`.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.bottom, self.left], [self.top, self.right]]
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.bottom..=self.top).contains(&latitude) && (self.left..=self.right).contains(&longitude)
    }
}

/// Single-band grid of values in row-major order, row 0 at the top (north).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    values: Vec<f32>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize, values: Vec<f32>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(MapError::InvalidFormat(format!(
                "Grid dimensions must be non-zero, got {}x{}",
                rows, cols
            )));
        }
        if values.len() != rows * cols {
            return Err(MapError::InvalidFormat(format!(
                "Grid of {}x{} needs {} values, got {}",
                rows,
                cols,
                rows * cols,
                values.len()
            )));
        }

        Ok(Self { rows, cols, values })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            self.values.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    /// Minimum and maximum over finite cells; `None` when every cell is no-data.
    pub fn finite_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// A decoded tile: grid plus the bounds it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTile {
    pub key: TileKey,
    pub grid: Grid,
    pub bounds: Bounds,
}

impl RasterTile {
    /// Rejects tiles whose bounds are degenerate or non-finite.
    pub fn new(key: TileKey, grid: Grid, bounds: Bounds) -> Result<Self> {
        if !bounds.is_valid() {
            return Err(MapError::Decode {
                tile: key.to_string(),
                reason: format!("degenerate bounds {:?}", bounds),
            });
        }

        Ok(Self { key, grid, bounds })
    }
}

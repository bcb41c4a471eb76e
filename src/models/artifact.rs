use crate::error::MapError;
use crate::models::encoding::Legend;
use crate::models::raster::Bounds;
use crate::models::variable::{DayOffset, Variable};
use image::RgbaImage;
use serde::Serialize;

/// Frames per second of every timelapse animation.
pub const TIMELAPSE_FPS: u32 = 1;

/// A georeferenced image layer for one (variable, day).
#[derive(Debug, Clone)]
pub struct OverlayArtifact {
    pub variable: Variable,
    pub day: DayOffset,
    pub image: RgbaImage,
    pub bounds: Bounds,
}

impl OverlayArtifact {
    pub fn metadata(&self, legend: &Legend) -> OverlayMetadata {
        OverlayMetadata {
            variable: self.variable,
            day: self.day,
            width: self.image.width(),
            height: self.image.height(),
            bounds: self.bounds.corners(),
            legend: legend.clone(),
        }
    }
}

/// JSON sidecar written next to an overlay image.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayMetadata {
    pub variable: Variable,
    pub day: DayOffset,
    pub width: u32,
    pub height: u32,
    pub bounds: [[f64; 2]; 2],
    pub legend: Legend,
}

/// Two independently composed overlays shown side by side.
#[derive(Debug, Clone)]
pub struct ComparisonArtifact {
    pub left: OverlayArtifact,
    pub right: OverlayArtifact,
    pub legend: Legend,
}

#[derive(Debug, Clone)]
pub struct TimelapseFrame {
    pub day: DayOffset,
    pub image: RgbaImage,
}

/// Ordered per-day frames, oldest first, played at [`TIMELAPSE_FPS`].
#[derive(Debug, Clone)]
pub struct TimelapseArtifact {
    pub variable: Variable,
    pub frames: Vec<TimelapseFrame>,
    pub fps: u32,
}

impl TimelapseArtifact {
    pub fn days(&self) -> Vec<DayOffset> {
        self.frames.iter().map(|f| f.day).collect()
    }

    pub fn frame_delay_ms(&self) -> u32 {
        1000 / self.fps.max(1)
    }
}

/// A unit of best-effort work that did not make it into the result.
#[derive(Debug)]
pub struct Failure {
    pub subject: String,
    pub error: MapError,
}

impl Failure {
    pub fn new(subject: impl Into<String>, error: MapError) -> Self {
        Self {
            subject: subject.into(),
            error,
        }
    }
}

/// Successes and failures of a skip-and-continue loop.
#[derive(Debug)]
pub struct Outcome<T> {
    pub items: Vec<T>,
    pub failures: Vec<Failure>,
}

impl<T> Outcome<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn push(&mut self, subject: impl Into<String>, result: Result<T, MapError>) {
        match result {
            Ok(item) => self.items.push(item),
            Err(error) => self.failures.push(Failure::new(subject, error)),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Emit each failure as a warning and keep the successes.
    pub fn log_failures(&self, context: &str) {
        for failure in &self.failures {
            tracing::warn!("{}: skipped {}: {}", context, failure.subject, failure.error);
        }
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_splits_results() {
        let mut outcome = Outcome::new();
        outcome.push("a", Ok(1));
        outcome.push("b", Err(MapError::InvalidRadius("-1".to_string())));
        outcome.push("c", Ok(3));

        assert_eq!(outcome.items, vec![1, 3]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].subject, "b");
        assert!(!outcome.is_clean());
    }
}

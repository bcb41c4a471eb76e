use crate::error::{MapError, Result};
use crate::models::{
    DayOffset, Failure, Outcome, TimelapseArtifact, TimelapseFrame, Variable, TIMELAPSE_FPS,
};
use crate::processors::frame_plotter::FrameRenderer;
use crate::readers::TileStore;
use crate::utils::ProgressReporter;

/// Frames that made it plus the days that were skipped.
#[derive(Debug)]
pub struct TimelapseOutcome {
    pub artifact: TimelapseArtifact,
    pub failures: Vec<Failure>,
}

pub struct TimelapseAssembler<'a> {
    store: &'a dyn TileStore,
    renderer: &'a dyn FrameRenderer,
    show_progress: bool,
}

impl<'a> TimelapseAssembler<'a> {
    pub fn new(store: &'a dyn TileStore, renderer: &'a dyn FrameRenderer) -> Self {
        Self {
            store,
            renderer,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Render J-6 through J0 in order. A day that fails to resolve or
    /// render leaves a gap; the remaining frames keep their order.
    pub fn assemble(&self, variable: Variable) -> Result<TimelapseOutcome> {
        let progress = ProgressReporter::new(
            DayOffset::WINDOW_LEN as u64,
            &format!("Rendering {} frames", variable),
            !self.show_progress,
        );

        let mut outcome = Outcome::new();
        for day in DayOffset::window() {
            progress.set_message(&format!("{} {}", variable, day.label()));
            outcome.push(day.label(), self.frame(variable, day));
            progress.increment(1);
        }
        progress.finish_with_message(&format!(
            "{} of {} frames rendered",
            outcome.items.len(),
            DayOffset::WINDOW_LEN
        ));

        outcome.log_failures(&format!("{} timelapse", variable));
        if outcome.items.is_empty() {
            return Err(MapError::EmptySequence {
                variable: variable.to_string(),
            });
        }

        Ok(TimelapseOutcome {
            artifact: TimelapseArtifact {
                variable,
                frames: outcome.items,
                fps: TIMELAPSE_FPS,
            },
            failures: outcome.failures,
        })
    }

    fn frame(&self, variable: Variable, day: DayOffset) -> Result<TimelapseFrame> {
        let tile = self.store.resolve(variable, day)?;
        let image = self.renderer.render_frame(&tile)?;
        Ok(TimelapseFrame { day, image })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RasterTile;
    use crate::processors::PlotFrameRenderer;
    use crate::test_support::MemoryTileStore;
    use image::RgbaImage;
    use pretty_assertions::assert_eq;

    /// Tiny renderer so the tests do not pay for plotting.
    struct SolidRenderer;

    impl FrameRenderer for SolidRenderer {
        fn render_frame(&self, tile: &RasterTile) -> Result<RgbaImage> {
            let shade = (tile.key.day.index() * 30) as u8;
            Ok(RgbaImage::from_pixel(4, 4, image::Rgba([shade, 0, 0, 255])))
        }
    }

    fn days(outcome: &TimelapseOutcome) -> Vec<i32> {
        outcome.artifact.days().iter().map(|d| d.value()).collect()
    }

    #[test]
    fn test_frames_ascend_through_window() -> Result<()> {
        let store = MemoryTileStore::full_window();
        let outcome = TimelapseAssembler::new(&store, &SolidRenderer).assemble(Variable::Humidity)?;

        assert_eq!(days(&outcome), vec![-6, -5, -4, -3, -2, -1, 0]);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.artifact.fps, 1);
        assert_eq!(outcome.artifact.frame_delay_ms(), 1000);
        Ok(())
    }

    #[test]
    fn test_failed_day_leaves_a_gap() -> Result<()> {
        let store = MemoryTileStore::full_window().failing_on(Variable::Temperature, -3);
        let outcome =
            TimelapseAssembler::new(&store, &SolidRenderer).assemble(Variable::Temperature)?;

        assert_eq!(days(&outcome), vec![-6, -5, -4, -2, -1, 0]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].subject, "J-3");

        // Earlier frames are untouched by the failure.
        let first = &outcome.artifact.frames[0];
        assert_eq!(first.image.get_pixel(0, 0).0, [0, 0, 0, 255]);
        let third = &outcome.artifact.frames[2];
        assert_eq!(third.image.get_pixel(0, 0).0, [60, 0, 0, 255]);
        Ok(())
    }

    #[test]
    fn test_no_frames_is_empty_sequence() {
        let mut store = MemoryTileStore::full_window();
        for day in DayOffset::window() {
            store = store.failing_on(Variable::Precipitation, day.value());
        }

        let result = TimelapseAssembler::new(&store, &SolidRenderer).assemble(Variable::Precipitation);
        assert!(matches!(result, Err(MapError::EmptySequence { .. })));
    }

    #[test]
    fn test_plotted_frames_with_a_gap() -> Result<()> {
        let store = MemoryTileStore::full_window().failing_on(Variable::Temperature, -4);
        let renderer = PlotFrameRenderer::new(240, 180);
        let outcome = TimelapseAssembler::new(&store, &renderer).assemble(Variable::Temperature)?;

        assert_eq!(days(&outcome), vec![-6, -5, -3, -2, -1, 0]);
        assert_eq!(outcome.failures.len(), 1);
        assert!(outcome
            .artifact
            .frames
            .iter()
            .all(|f| f.image.dimensions() == (240, 180)));
        Ok(())
    }
}

use crate::error::{MapError, Result};
use crate::models::{ComparisonArtifact, DayOffset, Legend, OverlayArtifact, Variable};
use crate::processors::classifier::Scheme;
use crate::processors::frame_plotter::FrameRenderer;
use crate::processors::legend_builder::build_legend;
use crate::processors::overlay_compositor::{compare, overlay_for_day, OverlayStyle};
use crate::processors::timelapse_assembler::{TimelapseAssembler, TimelapseOutcome};
use crate::readers::{CachedTileStore, TileStore};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Single,
    Compare,
    Timelapse,
}

impl RenderMode {
    /// Number of day offsets a request in this mode must carry.
    pub fn expected_days(&self) -> usize {
        match self {
            RenderMode::Single => 1,
            RenderMode::Compare => 2,
            RenderMode::Timelapse => 0,
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RenderMode::Single => write!(f, "single"),
            RenderMode::Compare => write!(f, "compare"),
            RenderMode::Timelapse => write!(f, "timelapse"),
        }
    }
}

/// What to draw. Timelapses always span the whole window and take no days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub variable: Variable,
    pub days: Vec<DayOffset>,
    pub mode: RenderMode,
}

impl RenderRequest {
    pub fn single(variable: Variable, day: DayOffset) -> Self {
        Self {
            variable,
            days: vec![day],
            mode: RenderMode::Single,
        }
    }

    pub fn compare(variable: Variable, first: DayOffset, second: DayOffset) -> Self {
        Self {
            variable,
            days: vec![first, second],
            mode: RenderMode::Compare,
        }
    }

    pub fn timelapse(variable: Variable) -> Self {
        Self {
            variable,
            days: Vec::new(),
            mode: RenderMode::Timelapse,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let expected = self.mode.expected_days();
        if self.days.len() != expected {
            return Err(MapError::InvalidRequest(format!(
                "{} render of {} takes {} day(s), got {}",
                self.mode,
                self.variable,
                expected,
                self.days.len()
            )));
        }
        Ok(())
    }
}

/// Rendered output, handed back to the caller to display or write.
#[derive(Debug)]
pub enum Artifact {
    Overlay {
        overlay: OverlayArtifact,
        legend: Legend,
    },
    Comparison(ComparisonArtifact),
    Timelapse(TimelapseOutcome),
}

/// Everything a render needs besides the request itself.
pub struct RenderContext<'a> {
    pub store: &'a dyn TileStore,
    pub renderer: &'a dyn FrameRenderer,
    pub style: OverlayStyle,
    pub show_progress: bool,
}

/// Validate the request, then produce its artifact. Tiles are read at most
/// once per (variable, day) inside one call.
pub fn render(request: &RenderRequest, ctx: &RenderContext) -> Result<Artifact> {
    request.validate()?;
    let store = CachedTileStore::new(ctx.store);
    let variable = request.variable;

    tracing::info!(
        "Rendering {} {} from {}",
        request.mode,
        variable,
        ctx.store.describe()
    );

    let artifact = match (request.mode, request.days.as_slice()) {
        (RenderMode::Single, [day]) => Artifact::Overlay {
            overlay: overlay_for_day(&store, variable, *day, ctx.style)?,
            legend: build_legend(Scheme::RasterRamp(variable)),
        },
        (RenderMode::Compare, [first, second]) => {
            Artifact::Comparison(compare(&store, variable, *first, *second, ctx.style)?)
        }
        (RenderMode::Timelapse, []) => Artifact::Timelapse(
            TimelapseAssembler::new(&store, ctx.renderer)
                .with_progress(ctx.show_progress)
                .assemble(variable)?,
        ),
        (mode, days) => {
            return Err(MapError::InvalidRequest(format!(
                "{} render with {} day(s)",
                mode,
                days.len()
            )))
        }
    };

    tracing::debug!("{} tile(s) read for this render", store.cached());
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RasterTile;
    use crate::test_support::MemoryTileStore;
    use image::RgbaImage;

    struct BlankRenderer;

    impl FrameRenderer for BlankRenderer {
        fn render_frame(&self, _tile: &RasterTile) -> Result<RgbaImage> {
            Ok(RgbaImage::new(2, 2))
        }
    }

    fn context(store: &MemoryTileStore) -> RenderContext<'_> {
        RenderContext {
            store,
            renderer: &BlankRenderer,
            style: OverlayStyle::Opacity,
            show_progress: false,
        }
    }

    #[test]
    fn test_single_overlay_with_legend() -> Result<()> {
        let store = MemoryTileStore::full_window();
        let day = DayOffset::new(-1)?;
        let request = RenderRequest::single(Variable::Temperature, day);

        match render(&request, &context(&store))? {
            Artifact::Overlay { overlay, legend } => {
                assert_eq!(overlay.day, day);
                assert_eq!(legend.caption, "Legend - Min: 0, Max: 20 (Temperature)");
            }
            other => panic!("unexpected artifact {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_compare_same_day_reads_tile_once() -> Result<()> {
        let store = MemoryTileStore::full_window();
        let day = DayOffset::new(-4)?;
        let request = RenderRequest::compare(Variable::Humidity, day, day);

        assert!(matches!(
            render(&request, &context(&store))?,
            Artifact::Comparison(_)
        ));
        assert_eq!(store.calls(), 1);
        Ok(())
    }

    #[test]
    fn test_timelapse_request() -> Result<()> {
        let store = MemoryTileStore::full_window().failing_on(Variable::Precipitation, -3);
        let request = RenderRequest::timelapse(Variable::Precipitation);

        match render(&request, &context(&store))? {
            Artifact::Timelapse(outcome) => {
                assert_eq!(outcome.artifact.frames.len(), 6);
                assert_eq!(outcome.failures.len(), 1);
            }
            other => panic!("unexpected artifact {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_day_count_is_checked_before_reading() {
        let store = MemoryTileStore::full_window();
        let request = RenderRequest {
            variable: Variable::Temperature,
            days: vec![DayOffset::current()],
            mode: RenderMode::Compare,
        };

        assert!(matches!(
            render(&request, &context(&store)),
            Err(MapError::InvalidRequest(_))
        ));
        assert_eq!(store.calls(), 0);
    }

    #[test]
    fn test_missing_primary_tile_is_fatal() {
        let store = MemoryTileStore::full_window().failing_on(Variable::Temperature, 0);
        let request = RenderRequest::single(Variable::Temperature, DayOffset::current());
        assert!(render(&request, &context(&store)).is_err());
    }
}

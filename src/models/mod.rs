pub mod artifact;
pub mod encoding;
pub mod geometry;
pub mod raster;
pub mod station;
pub mod variable;

pub use artifact::{
    ComparisonArtifact, Failure, Outcome, OverlayArtifact, OverlayMetadata, TimelapseArtifact,
    TimelapseFrame, TIMELAPSE_FPS,
};
pub use encoding::{Color, Legend, LegendEntry, Swatch, VisualEncoding};
pub use geometry::{GeoPoint, Polygon, ViewBounds};
pub use raster::{Bounds, Grid, RasterTile};
pub use station::{StationColumn, StationRecord};
pub use variable::{DayOffset, MeanAttribute, TileKey, Variable};

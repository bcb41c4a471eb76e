pub mod bin_table;
pub mod classifier;
pub mod frame_plotter;
pub mod legend_builder;
pub mod map_scene;
pub mod overlay_compositor;
pub mod render;
pub mod spatial_query;
pub mod station_chart;
pub mod timelapse_assembler;

pub use classifier::{classify, Scheme};
pub use frame_plotter::{FrameRenderer, PlotFrameRenderer};
pub use legend_builder::build_legend;
pub use map_scene::{daily_map, mean_map, query_map, MapScene, Marker, SceneOutcome};
pub use overlay_compositor::{compare, compose, overlay_for_day, OverlayStyle};
pub use render::{render, Artifact, RenderContext, RenderMode, RenderRequest};
pub use station_chart::StationChart;
pub use timelapse_assembler::{TimelapseAssembler, TimelapseOutcome};

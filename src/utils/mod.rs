pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;
pub mod wkb;

pub use constants::*;
pub use coordinates::{haversine_distance, parse_lat_lon};
pub use filename::{default_overlay_filename, default_timelapse_filename, sidecar_path};
pub use progress::ProgressReporter;

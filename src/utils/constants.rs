/// Approximate kilometres per degree of latitude, used for buffer radii.
pub const KM_PER_DEGREE: f64 = 111.32;

/// Vertices (excluding the closing one) of a buffer disk approximation.
pub const BUFFER_SEGMENTS: usize = 64;

/// Default map view, centred on Morocco
pub const MAP_CENTER_LAT: f64 = 29.985782;
pub const MAP_CENTER_LON: f64 = -8.668263;
pub const MAP_ZOOM: f64 = 4.5;

/// Radius of plain station markers and of mean-attribute markers.
pub const STATION_MARKER_RADIUS: u32 = 1;
pub const MEAN_MARKER_RADIUS: u32 = 5;

/// Tile storage defaults
pub const DEFAULT_TILE_DIR: &str = "cliptemp";
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://cog2023.s3.eu-north-1.amazonaws.com/cog";
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;
pub const TILE_EXTENSION: &str = "tif";

/// Dataset defaults
pub const DEFAULT_DATASET_PATH: &str = "data/stations.parquet";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_CONFIG_FILE: &str = "clima-maps.toml";

/// Dataset column names besides the weekly series
pub const GEOMETRY_COLUMN: &str = "geometry";
pub const REGION_COLUMN: &str = "Nom_Region";
pub const DATE_COLUMN: &str = "DATE";

/// Timelapse frame geometry
pub const DEFAULT_FRAME_WIDTH: u32 = 800;
pub const DEFAULT_FRAME_HEIGHT: u32 = 800;
pub const COLORBAR_WIDTH: u32 = 110;
pub const COLORBAR_STEPS: usize = 64;

/// Transient timelapse areas older than this are swept
pub const DEFAULT_STALE_AFTER_SECS: u64 = 3600;
pub const TRANSIENT_PREFIX: &str = "clima-timelapse-";

/// Station chart size
pub const CHART_WIDTH: u32 = 600;
pub const CHART_HEIGHT: u32 = 400;

/// Parquet defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BATCH_SIZE: usize = 8192;

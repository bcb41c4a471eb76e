use thiserror::Error;

pub type Result<T> = std::result::Result<T, MapError>;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parquet read error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("No tile found for {tile}")]
    TileNotFound { tile: String },

    #[error("Failed to decode tile {tile}: {reason}")]
    Decode { tile: String, reason: String },

    #[error("Network fetch of {url} failed: {reason}")]
    NetworkFetch { url: String, reason: String },

    #[error("Cannot classify value {value} for {scheme}")]
    Classification { scheme: String, value: f64 },

    #[error("Invalid coordinate format: {0}")]
    InvalidCoordinateFormat(String),

    #[error("Invalid radius: {0}")]
    InvalidRadius(String),

    #[error("Day offset {0} is outside the window [-6, 0]")]
    InvalidDayOffset(i32),

    #[error("Timelapse for {variable} produced no frames")]
    EmptySequence { variable: String },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Invalid render request: {0}")]
    InvalidRequest(String),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl MapError {
    /// Errors that come from the tile backends rather than from the caller.
    pub fn is_tile_failure(&self) -> bool {
        matches!(
            self,
            MapError::TileNotFound { .. } | MapError::Decode { .. } | MapError::NetworkFetch { .. }
        )
    }
}

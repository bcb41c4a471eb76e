//! Layered settings: built-in defaults, then an optional TOML file, then
//! `CLIMA__SECTION__KEY` environment variables.

use crate::error::Result;
use crate::models::Variable;
use crate::processors::OverlayStyle;
use crate::utils::constants::*;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub tiles: TileSettings,
    pub dataset: DatasetSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileSettings {
    /// Directory holding pre-clipped `{code}{day}.tif` tiles.
    pub local_dir: PathBuf,
    /// Base URL of the hosted tile collection; remote fetching is off when empty.
    pub remote_base_url: String,
    /// Variables served from the remote collection instead of `local_dir`.
    /// Empty by default, so every variable is read locally.
    pub remote_variables: Vec<Variable>,
    pub remote_timeout_secs: u64,
}

impl TileSettings {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    pub fn remote_enabled(&self) -> bool {
        !self.remote_base_url.trim().is_empty() && !self.remote_variables.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSettings {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub frame_width: u32,
    pub frame_height: u32,
    pub overlay_style: OverlayStyle,
    pub stale_after_secs: u64,
}

impl Settings {
    /// Load settings; `path` is required when given, otherwise
    /// `clima-maps.toml` in the working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_source = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let settings = Self::defaults()?
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("CLIMA")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("tiles.remote_variables"),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    fn defaults() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>> {
        let builder = Config::builder()
            .set_default("tiles.local_dir", DEFAULT_TILE_DIR)?
            .set_default("tiles.remote_base_url", DEFAULT_REMOTE_BASE_URL)?
            .set_default("tiles.remote_variables", Vec::<String>::new())?
            .set_default("tiles.remote_timeout_secs", DEFAULT_REMOTE_TIMEOUT_SECS as i64)?
            .set_default("dataset.path", DEFAULT_DATASET_PATH)?
            .set_default("output.dir", DEFAULT_OUTPUT_DIR)?
            .set_default("output.frame_width", DEFAULT_FRAME_WIDTH as i64)?
            .set_default("output.frame_height", DEFAULT_FRAME_HEIGHT as i64)?
            .set_default("output.overlay_style", "opacity")?
            .set_default("output.stale_after_secs", DEFAULT_STALE_AFTER_SECS as i64)?;

        Ok(builder)
    }
}

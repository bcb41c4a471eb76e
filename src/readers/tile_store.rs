use crate::config::TileSettings;
use crate::error::{MapError, Result};
use crate::models::{DayOffset, RasterTile, TileKey, Variable};
use crate::readers::geotiff::decode_tile;
use crate::readers::remote_tile_store::RemoteTileStore;
use crate::utils::constants::TILE_EXTENSION;
use memmap2::Mmap;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Resolves a (variable, day) pair to a decoded tile with valid bounds.
pub trait TileStore {
    fn resolve(&self, variable: Variable, day: DayOffset) -> Result<RasterTile>;

    /// Short human description for logs and `info`.
    fn describe(&self) -> String;
}

/// Pre-clipped tiles on disk, named `{code}{day}.tif`.
pub struct LocalTileStore {
    root: PathBuf,
}

impl LocalTileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tile_path(&self, key: TileKey) -> PathBuf {
        self.root.join(format!("{}.{}", key, TILE_EXTENSION))
    }
}

impl TileStore for LocalTileStore {
    fn resolve(&self, variable: Variable, day: DayOffset) -> Result<RasterTile> {
        let key = TileKey::new(variable, day);
        let path = self.tile_path(key);

        if !path.is_file() {
            return Err(MapError::TileNotFound {
                tile: path.display().to_string(),
            });
        }

        let file = File::open(&path)?;
        if file.metadata()?.len() == 0 {
            return Err(MapError::Decode {
                tile: key.to_string(),
                reason: format!("{} is empty", path.display()),
            });
        }

        // Tiles are read-only inputs; nothing in the process writes to them.
        let mmap = unsafe { Mmap::map(&file)? };
        tracing::debug!("Mapped {} ({} bytes)", path.display(), mmap.len());

        decode_tile(key, Cursor::new(&mmap[..]))
    }

    fn describe(&self) -> String {
        format!("local:{}", self.root.display())
    }
}

/// Sends each variable to the remote collection when configured for it,
/// otherwise to the local directory.
pub struct TileRouter {
    local: LocalTileStore,
    remote: Option<RemoteTileStore>,
}

impl TileRouter {
    pub fn new(local: LocalTileStore, remote: Option<RemoteTileStore>) -> Self {
        Self { local, remote }
    }

    pub fn from_settings(settings: &TileSettings) -> Result<Self> {
        let local = LocalTileStore::new(&settings.local_dir);
        let remote = if settings.remote_enabled() {
            Some(RemoteTileStore::new(
                &settings.remote_base_url,
                settings.remote_variables.clone(),
                settings.remote_timeout(),
            )?)
        } else {
            None
        };

        Ok(Self::new(local, remote))
    }

    fn route(&self, variable: Variable) -> &dyn TileStore {
        match &self.remote {
            Some(remote) if remote.serves(variable) => remote as &dyn TileStore,
            _ => &self.local,
        }
    }
}

impl TileStore for TileRouter {
    fn resolve(&self, variable: Variable, day: DayOffset) -> Result<RasterTile> {
        let store = self.route(variable);
        tracing::debug!("Resolving {}{} via {}", variable.code(), day, store.describe());
        store.resolve(variable, day)
    }

    fn describe(&self) -> String {
        match &self.remote {
            Some(remote) => format!("{} + {}", self.local.describe(), remote.describe()),
            None => self.local.describe(),
        }
    }
}

/// Memoizes tiles for the lifetime of one render. Errors are not cached.
pub struct CachedTileStore<'a> {
    inner: &'a dyn TileStore,
    cache: RefCell<HashMap<TileKey, RasterTile>>,
}

impl<'a> CachedTileStore<'a> {
    pub fn new(inner: &'a dyn TileStore) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl TileStore for CachedTileStore<'_> {
    fn resolve(&self, variable: Variable, day: DayOffset) -> Result<RasterTile> {
        let key = TileKey::new(variable, day);
        if let Some(tile) = self.cache.borrow().get(&key) {
            return Ok(tile.clone());
        }

        let tile = self.inner.resolve(variable, day)?;
        self.cache.borrow_mut().insert(key, tile.clone());
        Ok(tile)
    }

    fn describe(&self) -> String {
        format!("cached({})", self.inner.describe())
    }
}

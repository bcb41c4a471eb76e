//! Fixtures shared by the unit test modules.

use crate::error::{MapError, Result};
use crate::models::{Bounds, DayOffset, Grid, RasterTile, StationRecord, TileKey, Variable};
use crate::readers::{geotiff, TileStore};
use chrono::NaiveDate;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

pub fn sample_record() -> StationRecord {
    StationRecord {
        id: 7,
        region: "Souss-Massa".to_string(),
        date: NaiveDate::from_ymd_opt(2023, 12, 10).unwrap(),
        latitude: 30.42,
        longitude: -9.6,
        precipitation: [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        temperature: [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0],
        humidity: [20.0, 21.0, 22.0, 23.0, 24.0, 25.0, 26.0],
        mean_temperature: 20.5,
        mean_humidity: 30.1,
    }
}

pub fn station(id: usize, region: &str, latitude: f64, longitude: f64) -> StationRecord {
    StationRecord {
        id,
        region: region.to_string(),
        latitude,
        longitude,
        ..sample_record()
    }
}

pub fn morocco_bounds() -> Bounds {
    Bounds::new(27.0, -13.0, 36.0, -1.0)
}

/// `rows x cols` grid rising linearly from 0 to `max` in reading order.
pub fn ramp_grid(rows: usize, cols: usize, max: f32) -> Grid {
    let n = rows * cols;
    let values = (0..n)
        .map(|i| if n > 1 { max * i as f32 / (n - 1) as f32 } else { max })
        .collect();
    Grid::new(rows, cols, values).unwrap()
}

pub fn sample_tile(variable: Variable, day: i32) -> RasterTile {
    RasterTile::new(
        TileKey::new(variable, DayOffset::new(day).unwrap()),
        ramp_grid(4, 5, 20.0),
        morocco_bounds(),
    )
    .unwrap()
}

/// Write `{dir}/{code}{day}.tif` and return its path.
pub fn write_tile_file(dir: &Path, key: TileKey, grid: &Grid, bounds: &Bounds) -> PathBuf {
    let path = dir.join(format!("{}.tif", key));
    let file = File::create(&path).unwrap();
    geotiff::write_tile(std::io::BufWriter::new(file), grid, bounds).unwrap();
    path
}

/// In-memory store that serves every key from a template grid except
/// the ones marked as failing, and counts resolutions.
pub struct MemoryTileStore {
    tiles: HashMap<TileKey, RasterTile>,
    failing: HashSet<TileKey>,
    calls: Cell<usize>,
}

impl MemoryTileStore {
    pub fn full_window() -> Self {
        let mut tiles = HashMap::new();
        for variable in Variable::ALL {
            for day in DayOffset::window() {
                let tile = sample_tile(variable, day.value());
                tiles.insert(tile.key, tile);
            }
        }

        Self {
            tiles,
            failing: HashSet::new(),
            calls: Cell::new(0),
        }
    }

    pub fn failing_on(mut self, variable: Variable, day: i32) -> Self {
        self.failing
            .insert(TileKey::new(variable, DayOffset::new(day).unwrap()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl TileStore for MemoryTileStore {
    fn resolve(&self, variable: Variable, day: DayOffset) -> Result<RasterTile> {
        self.calls.set(self.calls.get() + 1);
        let key = TileKey::new(variable, day);
        if self.failing.contains(&key) {
            return Err(MapError::Decode {
                tile: key.to_string(),
                reason: "corrupt test tile".to_string(),
            });
        }

        self.tiles
            .get(&key)
            .cloned()
            .ok_or(MapError::TileNotFound {
                tile: key.to_string(),
            })
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

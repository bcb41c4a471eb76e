pub mod geotiff;
pub mod remote_tile_store;
pub mod station_reader;
pub mod tile_store;

pub use remote_tile_store::RemoteTileStore;
pub use station_reader::{StationDataset, StationReader};
pub use tile_store::{CachedTileStore, LocalTileStore, TileRouter, TileStore};

pub mod artifact_writer;
pub mod parquet_writer;
pub mod transient;

pub use artifact_writer::{
    encode_gif, write_comparison, write_json, write_overlay, write_png, write_timelapse,
    WrittenOverlay,
};
pub use parquet_writer::{ParquetFileInfo, StationParquetWriter};
pub use transient::{cleanup_stale_areas, TransientArea};

//! Single-band GeoTIFF decoding into a [`Grid`] plus geographic [`Bounds`].
//!
//! Georeferencing comes from the `ModelPixelScale` and `ModelTiepoint`
//! tags, which is how the clipped tiles and the hosted COGs are written.

use crate::error::{MapError, Result};
use crate::models::{Bounds, Grid, RasterTile, TileKey};
use std::io::{Read, Seek, Write};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::ColorType;

fn decode_err(key: &TileKey, reason: impl ToString) -> MapError {
    MapError::Decode {
        tile: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Decode band 0 of a single-band TIFF and its bounds.
pub fn decode_tile<R: Read + Seek>(key: TileKey, reader: R) -> Result<RasterTile> {
    let mut decoder = Decoder::new(reader)
        .map_err(|e| decode_err(&key, e))?
        .with_limits(Limits::unlimited());

    match decoder.colortype().map_err(|e| decode_err(&key, e))? {
        ColorType::Gray(_) => {}
        other => {
            return Err(decode_err(
                &key,
                format!("expected a single-band grid, found {:?}", other),
            ))
        }
    }

    let (width, height) = decoder.dimensions().map_err(|e| decode_err(&key, e))?;
    let bounds = read_bounds(&mut decoder, width, height).map_err(|reason| decode_err(&key, reason))?;

    let values = match decoder.read_image().map_err(|e| decode_err(&key, e))? {
        DecodingResult::U8(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U16(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I16(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        #[allow(unreachable_patterns)]
        _ => return Err(decode_err(&key, "unsupported sample format")),
    };

    let grid = Grid::new(height as usize, width as usize, values).map_err(|e| decode_err(&key, e))?;
    let tile = RasterTile::new(key, grid, bounds)?;

    tracing::debug!(
        "Decoded {} ({}x{}) bounds {:?}",
        key,
        width,
        height,
        tile.bounds
    );

    Ok(tile)
}

fn read_bounds<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    width: u32,
    height: u32,
) -> std::result::Result<Bounds, String> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| "missing ModelPixelScale tag".to_string())?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| "missing ModelTiepoint tag".to_string())?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(format!(
            "malformed georeferencing: {} scale values, {} tiepoint values",
            scale.len(),
            tiepoint.len()
        ));
    }

    let (pixel_w, pixel_h) = (scale[0], scale[1]);
    let (raster_i, raster_j) = (tiepoint[0], tiepoint[1]);
    let (model_x, model_y) = (tiepoint[3], tiepoint[4]);

    let left = model_x - raster_i * pixel_w;
    let top = model_y + raster_j * pixel_h;
    let right = left + width as f64 * pixel_w;
    let bottom = top - height as f64 * pixel_h;

    Ok(Bounds::new(bottom, left, top, right))
}

/// Write a grid as a 32-bit float GeoTIFF georeferenced to `bounds`.
pub fn write_tile<W: Write + Seek>(writer: W, grid: &Grid, bounds: &Bounds) -> Result<()> {
    let encode_err = |e: tiff::TiffError| MapError::Encode(e.to_string());

    let width = grid.cols() as u32;
    let height = grid.rows() as u32;
    let pixel_w = bounds.width() / width as f64;
    let pixel_h = bounds.height() / height as f64;

    let mut encoder = TiffEncoder::new(writer).map_err(encode_err)?;
    let mut image = encoder
        .new_image::<colortype::Gray32Float>(width, height)
        .map_err(encode_err)?;

    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[pixel_w, pixel_h, 0.0][..])
        .map_err(encode_err)?;
    image
        .encoder()
        .write_tag(
            Tag::ModelTiepointTag,
            &[0.0, 0.0, 0.0, bounds.left, bounds.top, 0.0][..],
        )
        .map_err(encode_err)?;

    image.write_data(grid.values()).map_err(encode_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayOffset, Variable};
    use std::io::Cursor;

    fn key() -> TileKey {
        TileKey::new(Variable::Temperature, DayOffset::new(-1).unwrap())
    }

    #[test]
    fn test_decode_written_tile() -> Result<()> {
        let grid = Grid::new(2, 3, vec![0.0, 5.0, 10.0, 15.0, f32::NAN, 20.0])?;
        let bounds = Bounds::new(27.0, -13.0, 36.0, -1.0);

        let mut bytes = Cursor::new(Vec::new());
        write_tile(&mut bytes, &grid, &bounds)?;
        bytes.set_position(0);

        let tile = decode_tile(key(), bytes)?;
        assert_eq!(tile.key, key());
        assert_eq!(tile.grid.rows(), 2);
        assert_eq!(tile.grid.cols(), 3);
        assert_eq!(tile.grid.get(0, 2), Some(10.0));
        assert!(tile.grid.get(1, 1).unwrap().is_nan());

        assert!((tile.bounds.bottom - 27.0).abs() < 1e-9);
        assert!((tile.bounds.left + 13.0).abs() < 1e-9);
        assert!((tile.bounds.top - 36.0).abs() < 1e-9);
        assert!((tile.bounds.right + 1.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = decode_tile(key(), Cursor::new(b"not a tiff at all".to_vec()));
        assert!(matches!(result, Err(MapError::Decode { .. })));
    }

    #[test]
    fn test_missing_georeferencing_is_decode_error() -> Result<()> {
        let mut bytes = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut bytes).map_err(|e| MapError::Encode(e.to_string()))?;
            encoder
                .write_image::<colortype::Gray32Float>(2, 1, &[1.0, 2.0])
                .map_err(|e| MapError::Encode(e.to_string()))?;
        }
        bytes.set_position(0);

        let result = decode_tile(key(), bytes);
        assert!(matches!(result, Err(MapError::Decode { .. })));
        Ok(())
    }

    #[test]
    fn test_multiband_is_decode_error() -> Result<()> {
        let mut bytes = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut bytes).map_err(|e| MapError::Encode(e.to_string()))?;
            encoder
                .write_image::<colortype::RGB8>(1, 1, &[1, 2, 3])
                .map_err(|e| MapError::Encode(e.to_string()))?;
        }
        bytes.set_position(0);

        let result = decode_tile(key(), bytes);
        assert!(matches!(result, Err(MapError::Decode { .. })));
        Ok(())
    }
}

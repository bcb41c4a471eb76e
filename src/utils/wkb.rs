//! Minimal well-known binary codec for the point geometries of the station dataset.

use crate::error::{MapError, Result};
use crate::models::GeoPoint;

const WKB_POINT: u32 = 1;
const EWKB_SRID_FLAG: u32 = 0x2000_0000;
const EWKB_Z_FLAG: u32 = 0x8000_0000;
const EWKB_M_FLAG: u32 = 0x4000_0000;

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    little_endian: bool,
}

impl<'a> Cursor<'a> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        let slice = self.bytes.get(self.pos..end).ok_or_else(|| {
            MapError::InvalidFormat(format!(
                "WKB truncated: needed {} bytes at offset {}, have {}",
                N,
                self.pos,
                self.bytes.len()
            ))
        })?;
        self.pos = end;

        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let raw = self.take::<4>()?;
        Ok(if self.little_endian {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        })
    }

    fn read_f64(&mut self) -> Result<f64> {
        let raw = self.take::<8>()?;
        Ok(if self.little_endian {
            f64::from_le_bytes(raw)
        } else {
            f64::from_be_bytes(raw)
        })
    }
}

/// Decode a 2-D point from ISO WKB or PostGIS EWKB (an SRID is skipped,
/// Z/M ordinates are read and dropped).
pub fn decode_point(bytes: &[u8]) -> Result<GeoPoint> {
    let order = *bytes
        .first()
        .ok_or_else(|| MapError::InvalidFormat("Empty WKB geometry".to_string()))?;

    let little_endian = match order {
        0 => false,
        1 => true,
        other => {
            return Err(MapError::InvalidFormat(format!(
                "Invalid WKB byte order marker: {}",
                other
            )))
        }
    };

    let mut cursor = Cursor {
        bytes,
        pos: 1,
        little_endian,
    };

    let raw_type = cursor.read_u32()?;
    let has_srid = raw_type & EWKB_SRID_FLAG != 0;
    let mut has_z = raw_type & EWKB_Z_FLAG != 0;
    let mut has_m = raw_type & EWKB_M_FLAG != 0;
    let mut base_type = raw_type & 0x0FFF_FFFF;

    // ISO flavour encodes dimensions in the thousands
    match base_type / 1000 {
        1 => has_z = true,
        2 => has_m = true,
        3 => {
            has_z = true;
            has_m = true;
        }
        _ => {}
    }
    base_type %= 1000;

    if base_type != WKB_POINT {
        return Err(MapError::InvalidFormat(format!(
            "Expected a WKB point, got geometry type {}",
            raw_type
        )));
    }

    if has_srid {
        cursor.read_u32()?;
    }

    let x = cursor.read_f64()?;
    let y = cursor.read_f64()?;
    if has_z {
        cursor.read_f64()?;
    }
    if has_m {
        cursor.read_f64()?;
    }

    if x.is_nan() || y.is_nan() {
        return Err(MapError::InvalidFormat("Empty WKB point".to_string()));
    }

    Ok(GeoPoint::new(y, x))
}

/// Encode a point as little-endian ISO WKB (x = longitude, y = latitude).
pub fn encode_point(point: GeoPoint) -> Vec<u8> {
    let mut out = Vec::with_capacity(21);
    out.push(1);
    out.extend_from_slice(&WKB_POINT.to_le_bytes());
    out.extend_from_slice(&point.longitude.to_le_bytes());
    out.extend_from_slice(&point.latitude.to_le_bytes());
    out
}

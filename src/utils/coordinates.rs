use crate::error::{MapError, Result};
use crate::models::GeoPoint;

/// Parse a `"latitude, longitude"` pair in decimal degrees.
///
/// # Examples
/// ```
/// use clima_maps::utils::parse_lat_lon;
///
/// let point = parse_lat_lon("31.5, -8.0").unwrap();
/// assert_eq!(point.latitude, 31.5);
/// assert_eq!(point.longitude, -8.0);
/// ```
pub fn parse_lat_lon(input: &str) -> Result<GeoPoint> {
    let parts: Vec<&str> = input.split(',').map(|p| p.trim()).collect();

    if parts.len() != 2 {
        return Err(MapError::InvalidCoordinateFormat(format!(
            "'{}'. Expected format: 'latitude, longitude'",
            input
        )));
    }

    let latitude = parse_coordinate(parts[0])?;
    let longitude = parse_coordinate(parts[1])?;
    validate_lat_lon(latitude, longitude)?;

    Ok(GeoPoint::new(latitude, longitude))
}

/// Parse one decimal-degree value
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let trimmed = coord_str.trim();
    let value = trimmed.parse::<f64>().map_err(|_| {
        MapError::InvalidCoordinateFormat(format!("Invalid coordinate value: '{}'", coord_str))
    })?;

    if !value.is_finite() {
        return Err(MapError::InvalidCoordinateFormat(format!(
            "Coordinate must be finite, got: '{}'",
            coord_str
        )));
    }

    Ok(value)
}

/// Validate WGS84 latitude/longitude ranges
pub fn validate_lat_lon(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(MapError::InvalidCoordinateFormat(format!(
            "Latitude {} is outside [-90, 90]",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(MapError::InvalidCoordinateFormat(format!(
            "Longitude {} is outside [-180, 180]",
            longitude
        )));
    }

    Ok(())
}

/// Calculate the distance between two points using the Haversine formula
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

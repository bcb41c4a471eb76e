use crate::error::{MapError, Result};
use crate::models::{DayOffset, GeoPoint, Polygon, StationColumn, StationRecord, Variable};
use crate::utils::constants::{BUFFER_SEGMENTS, KM_PER_DEGREE};
use crate::utils::haversine_distance;
use std::collections::HashSet;
use std::f64::consts::TAU;

/// Records whose `column` equals `value` exactly. NaN never matches.
pub fn filter_by_attribute<'a>(
    records: impl IntoIterator<Item = &'a StationRecord>,
    column: StationColumn,
    value: f64,
) -> Vec<&'a StationRecord> {
    records
        .into_iter()
        .filter(|r| r.value(column) == value)
        .collect()
}

/// Records where any of the seven days of `variable` equals `value`.
pub fn filter_by_attribute_any_day<'a>(
    records: impl IntoIterator<Item = &'a StationRecord>,
    variable: Variable,
    value: f64,
) -> Vec<&'a StationRecord> {
    records
        .into_iter()
        .filter(|r| r.series(variable).iter().any(|v| *v == value))
        .collect()
}

pub fn filter_by_region<'a>(
    records: impl IntoIterator<Item = &'a StationRecord>,
    region: &str,
) -> Vec<&'a StationRecord> {
    records.into_iter().filter(|r| r.in_region(region)).collect()
}

/// Distinct region labels in first-seen order.
pub fn regions<'a>(records: impl IntoIterator<Item = &'a StationRecord>) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.region.as_str()))
        .map(|r| r.region.clone())
        .collect()
}

/// Disk around the station approximated in degrees (`km / 111.32`), so it
/// is a circle in lat/lon space rather than on the ground.
pub fn buffer_around(record: &StationRecord, radius_km: f64) -> Result<Polygon> {
    check_radius(radius_km)?;
    Ok(disk(record.location(), radius_km / KM_PER_DEGREE))
}

fn disk(center: GeoPoint, radius_deg: f64) -> Polygon {
    let mut ring: Vec<[f64; 2]> = (0..BUFFER_SEGMENTS)
        .map(|i| {
            let angle = TAU * i as f64 / BUFFER_SEGMENTS as f64;
            [
                center.longitude + radius_deg * angle.cos(),
                center.latitude + radius_deg * angle.sin(),
            ]
        })
        .collect();

    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    Polygon::new(ring)
}

/// Records within `radius_km` great-circle distance of `center`.
pub fn within_radius<'a>(
    records: impl IntoIterator<Item = &'a StationRecord>,
    center: GeoPoint,
    radius_km: f64,
) -> Result<Vec<&'a StationRecord>> {
    check_radius(radius_km)?;
    Ok(records
        .into_iter()
        .filter(|r| {
            haversine_distance(center.latitude, center.longitude, r.latitude, r.longitude)
                <= radius_km
        })
        .collect())
}

/// Parse a radius in kilometres typed by a user.
pub fn parse_radius(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let radius = trimmed
        .parse::<f64>()
        .map_err(|_| MapError::InvalidRadius(format!("'{}' is not a number", trimmed)))?;
    check_radius(radius)?;
    Ok(radius)
}

/// Parse an attribute filter value; an empty field means 0.
pub fn parse_filter_value(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MapError::InvalidFormat(format!("Invalid filter value: '{}'", trimmed)))
}

/// Column for `variable` on `day`, or every day of it when `day` is absent.
pub fn filter_by_variable<'a>(
    records: impl IntoIterator<Item = &'a StationRecord>,
    variable: Variable,
    day: Option<DayOffset>,
    value: f64,
) -> Vec<&'a StationRecord> {
    match day {
        Some(day) => filter_by_attribute(records, StationColumn::Daily(variable, day), value),
        None => filter_by_attribute_any_day(records, variable, value),
    }
}

fn check_radius(radius_km: f64) -> Result<()> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(MapError::InvalidRadius(format!(
            "{} km (must be a non-negative number)",
            radius_km
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_record, station};
    use pretty_assertions::assert_eq;

    fn dataset() -> Vec<StationRecord> {
        let mut dry = station(1, "Souss-Massa", 30.4, -9.6);
        dry.precipitation[6] = 0.0;
        let mut wet = station(2, "Souss-Massa", 29.7, -9.7);
        wet.precipitation[6] = 12.0;
        let mut north = station(3, "Oriental", 34.7, -1.9);
        north.precipitation[6] = 0.0;
        let mut missing = station(4, "Souss-Massa", 30.0, -9.0);
        missing.precipitation[6] = f64::NAN;
        vec![dry, wet, north, missing]
    }

    fn ids(records: &[&StationRecord]) -> Vec<usize> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_region_then_attribute() -> Result<()> {
        let records = dataset();
        let column: StationColumn = "PRECIPITATJ0".parse()?;

        let in_region = filter_by_region(&records, "Souss-Massa");
        let matched = filter_by_attribute(in_region, column, 0.0);
        assert_eq!(ids(&matched), vec![1]);
        Ok(())
    }

    #[test]
    fn test_any_day_filter() {
        let records = dataset();
        // Every fixture record carries 5.0 at J-1 for precipitation.
        let matched = filter_by_attribute_any_day(&records, Variable::Precipitation, 5.0);
        assert_eq!(matched.len(), 4);

        let matched = filter_by_variable(&records, Variable::Precipitation, None, 12.0);
        assert_eq!(ids(&matched), vec![2]);
    }

    #[test]
    fn test_regions_in_first_seen_order() {
        assert_eq!(regions(&dataset()), vec!["Souss-Massa", "Oriental"]);
    }

    #[test]
    fn test_buffer_geometry() -> Result<()> {
        let record = sample_record();
        let buffer = buffer_around(&record, 10.0)?;

        assert_eq!(buffer.exterior.len(), BUFFER_SEGMENTS + 1);
        assert_eq!(buffer.exterior.first(), buffer.exterior.last());

        let expected = 10.0 / 111.32;
        for [lon, lat] in &buffer.exterior {
            let r = ((lon - record.longitude).powi(2) + (lat - record.latitude).powi(2)).sqrt();
            assert!((r - expected).abs() < 1e-9);
        }

        let centroid = buffer.centroid().unwrap();
        assert!((centroid.latitude - record.latitude).abs() < 1e-9);
        assert!((centroid.longitude - record.longitude).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_bad_radius() {
        let record = sample_record();
        assert!(matches!(
            buffer_around(&record, -1.0),
            Err(MapError::InvalidRadius(_))
        ));
        assert!(buffer_around(&record, f64::NAN).is_err());
        assert!(matches!(parse_radius("ten"), Err(MapError::InvalidRadius(_))));
        assert!(matches!(parse_radius("-3"), Err(MapError::InvalidRadius(_))));
        assert!(parse_radius("inf").is_err());
        assert_eq!(parse_radius(" 12.5 ").unwrap(), 12.5);
    }

    #[test]
    fn test_within_radius() -> Result<()> {
        let records = dataset();
        let center = GeoPoint::new(30.4, -9.6);

        let near = within_radius(&records, center, 100.0)?;
        assert_eq!(ids(&near), vec![1, 2, 4]);
        assert!(within_radius(&records, center, -5.0).is_err());
        Ok(())
    }

    #[test]
    fn test_filter_value_parsing() {
        assert_eq!(parse_filter_value("").unwrap(), 0.0);
        assert_eq!(parse_filter_value("12.5").unwrap(), 12.5);
        assert!(matches!(
            parse_filter_value("lots"),
            Err(MapError::InvalidFormat(_))
        ));
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A simple polygon with a closed exterior ring of (longitude, latitude) vertices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    pub exterior: Vec<[f64; 2]>,
}

impl Polygon {
    pub fn new(exterior: Vec<[f64; 2]>) -> Self {
        Self { exterior }
    }

    /// Area-weighted centroid from the shoelace formula, as a lat/lon point.
    pub fn centroid(&self) -> Option<GeoPoint> {
        if self.exterior.len() < 4 {
            return None;
        }

        let mut twice_area = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;

        for pair in self.exterior.windows(2) {
            let [x0, y0] = pair[0];
            let [x1, y1] = pair[1];
            let cross = x0 * y1 - x1 * y0;
            twice_area += cross;
            cx += (x0 + x1) * cross;
            cy += (y0 + y1) * cross;
        }

        if twice_area.abs() < f64::EPSILON {
            return None;
        }

        let factor = 1.0 / (3.0 * twice_area);
        Some(GeoPoint::new(cy * factor, cx * factor))
    }

    /// GeoJSON geometry object for the map canvas.
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "Polygon",
            "coordinates": [self.exterior],
        })
    }
}

/// South-west / north-east corners a map view should fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl ViewBounds {
    /// A view collapsed onto a single point.
    pub fn point(point: GeoPoint) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    pub fn is_point(&self) -> bool {
        self.south_west == self.north_east
    }
}

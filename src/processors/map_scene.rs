//! Serializable descriptions of station maps for an external map canvas.

use crate::error::Result;
use crate::models::{
    Color, DayOffset, Failure, GeoPoint, Legend, MeanAttribute, Outcome, Polygon, StationColumn,
    StationRecord, Variable, ViewBounds, VisualEncoding,
};
use crate::processors::classifier::{classify, Scheme};
use crate::processors::legend_builder::build_legend;
use crate::processors::spatial_query::buffer_around;
use crate::utils::constants::{MAP_CENTER_LAT, MAP_CENTER_LON, MAP_ZOOM, STATION_MARKER_RADIUS};
use crate::utils::parse_lat_lon;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: GeoPoint,
    pub encoding: VisualEncoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
}

impl Marker {
    pub fn new(position: GeoPoint, encoding: VisualEncoding) -> Self {
        Self {
            position,
            encoding,
            tooltip: None,
            popup: None,
        }
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_popup(mut self, popup: impl Into<String>) -> Self {
        self.popup = Some(popup.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MapScene {
    pub center: GeoPoint,
    pub zoom: f64,
    pub markers: Vec<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_bounds: Option<ViewBounds>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buffers: Vec<Polygon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
}

/// A scene plus the records that could not be drawn.
#[derive(Debug)]
pub struct SceneOutcome {
    pub scene: MapScene,
    pub failures: Vec<Failure>,
}

impl Default for MapScene {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(MAP_CENTER_LAT, MAP_CENTER_LON),
            zoom: MAP_ZOOM,
            markers: Vec::new(),
            highlight: None,
            fit_bounds: None,
            buffers: Vec::new(),
            legend: None,
        }
    }
}

impl MapScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every station as a small blue dot.
    pub fn station_points(records: &[StationRecord]) -> Self {
        let markers = records
            .iter()
            .map(|r| {
                Marker::new(
                    r.location(),
                    VisualEncoding::marker(Color::BLUE, STATION_MARKER_RADIUS),
                )
                .with_popup(format!("Point {}", r.id))
            })
            .collect();

        Self {
            markers,
            ..Self::default()
        }
    }

    /// Highlight a `"lat, lon"` search and zoom the view onto it. Malformed
    /// input is an error and leaves the caller's scene as it was.
    pub fn with_search(mut self, input: &str) -> Result<Self> {
        let point = parse_lat_lon(input)?;
        self.highlight = Some(
            Marker::new(point, VisualEncoding::fill(Color::RED)).with_popup("Searched point"),
        );
        self.fit_bounds = Some(ViewBounds::point(point));
        Ok(self)
    }
}

/// Stations classified by their value for one variable and day.
pub fn daily_map(records: &[StationRecord], variable: Variable, day: DayOffset) -> SceneOutcome {
    let column = StationColumn::Daily(variable, day);
    classified_map(records, column, Scheme::DailyMarker(variable))
}

/// Stations classified by one of their weekly means.
pub fn mean_map(records: &[StationRecord], attribute: MeanAttribute) -> SceneOutcome {
    let column = StationColumn::Mean(attribute);
    classified_map(records, column, Scheme::MeanAttribute(attribute))
}

fn classified_map(records: &[StationRecord], column: StationColumn, scheme: Scheme) -> SceneOutcome {
    let mut outcome = Outcome::new();
    for record in records {
        let value = record.value(column);
        let marker = classify(scheme, value).map(|encoding| {
            Marker::new(record.location(), encoding).with_tooltip(format!("{}: {}", column, value))
        });
        outcome.push(format!("station {} ({}: {})", record.id, column, value), marker);
    }
    outcome.log_failures(&format!("{} map", column));

    SceneOutcome {
        scene: MapScene {
            markers: outcome.items,
            legend: Some(build_legend(scheme)),
            ..MapScene::default()
        },
        failures: outcome.failures,
    }
}

/// Query results: a pin with a summary popup per record and, for a
/// positive radius, its buffer disk.
pub fn query_map(records: &[&StationRecord], radius_km: f64) -> Result<MapScene> {
    let mut scene = MapScene::new();

    for record in records {
        let popup = format!(
            "Date: {}\nRégion: {}\nTempérature moyenne: {}\nHumidité moyenne: {}",
            record.date, record.region, record.mean_temperature, record.mean_humidity
        );
        scene
            .markers
            .push(Marker::new(record.location(), VisualEncoding::fill(Color::BLUE)).with_popup(popup));

        let buffer = buffer_around(record, radius_km)?;
        if radius_km > 0.0 {
            scene.buffers.push(buffer);
        }
    }

    Ok(scene)
}

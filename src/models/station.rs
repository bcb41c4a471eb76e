use crate::error::{MapError, Result};
use crate::models::geometry::GeoPoint;
use crate::models::variable::{DayOffset, MeanAttribute, Variable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// One weather station row: a point, its region and a week of observations.
///
/// Weekly series are positional, index 0 = J-6 through index 6 = J0.
/// Missing observations are stored as NaN.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationRecord {
    pub id: usize,

    #[validate(length(min = 1))]
    pub region: String,

    pub date: NaiveDate,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub precipitation: [f64; 7],
    pub temperature: [f64; 7],
    pub humidity: [f64; 7],

    pub mean_temperature: f64,
    pub mean_humidity: f64,
}

impl StationRecord {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn series(&self, variable: Variable) -> &[f64; 7] {
        match variable {
            Variable::Precipitation => &self.precipitation,
            Variable::Temperature => &self.temperature,
            Variable::Humidity => &self.humidity,
        }
    }

    pub fn daily_value(&self, variable: Variable, day: DayOffset) -> f64 {
        self.series(variable)[day.index()]
    }

    pub fn mean_value(&self, attribute: MeanAttribute) -> f64 {
        match attribute {
            MeanAttribute::MeanTemperature => self.mean_temperature,
            MeanAttribute::MeanHumidity => self.mean_humidity,
        }
    }

    pub fn value(&self, column: StationColumn) -> f64 {
        match column {
            StationColumn::Daily(variable, day) => self.daily_value(variable, day),
            StationColumn::Mean(attribute) => self.mean_value(attribute),
        }
    }

    pub fn in_region(&self, region: &str) -> bool {
        self.region == region
    }
}

/// A numeric column of the station dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationColumn {
    Daily(Variable, DayOffset),
    Mean(MeanAttribute),
}

impl StationColumn {
    /// Every numeric column in dataset order: the 21 daily columns, then the means.
    pub fn all() -> Vec<StationColumn> {
        let mut columns: Vec<StationColumn> = Variable::ALL
            .iter()
            .flat_map(|&variable| {
                DayOffset::window().map(move |day| StationColumn::Daily(variable, day))
            })
            .collect();
        columns.extend(MeanAttribute::ALL.iter().map(|&a| StationColumn::Mean(a)));
        columns
    }

    pub fn name(&self) -> String {
        match self {
            StationColumn::Daily(variable, day) => variable.column_name(*day),
            StationColumn::Mean(attribute) => attribute.column_name().to_string(),
        }
    }
}

impl fmt::Display for StationColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for StationColumn {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_uppercase();
        StationColumn::all()
            .into_iter()
            .find(|column| column.name() == wanted)
            .ok_or_else(|| MapError::MissingColumn(s.trim().to_string()))
    }
}

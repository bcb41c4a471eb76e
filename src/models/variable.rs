use crate::error::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gridded climate variables available for every day of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    Precipitation,
    Temperature,
    Humidity,
}

impl Variable {
    pub const ALL: [Variable; 3] = [
        Variable::Precipitation,
        Variable::Temperature,
        Variable::Humidity,
    ];

    /// Short code used in tile file names (`prec-3.tif`, `humcog0.tif`).
    pub fn code(&self) -> &'static str {
        match self {
            Variable::Precipitation => "prec",
            Variable::Temperature => "temp",
            Variable::Humidity => "hum",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Variable::Precipitation => "Precipitation",
            Variable::Temperature => "Temperature",
            Variable::Humidity => "Humidity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Variable::Precipitation => "mm",
            Variable::Temperature => "°C",
            Variable::Humidity => "%",
        }
    }

    /// Name of the station column holding this variable for `day`.
    ///
    /// The dataset uses a different stem for the current day than for
    /// the historical days, e.g. `PRECIPITATJ0` but `PRECIPITJ_3`.
    pub fn column_name(&self, day: DayOffset) -> String {
        let (current, history) = match self {
            Variable::Precipitation => ("PRECIPITATJ", "PRECIPITJ_"),
            Variable::Temperature => ("TEMPERATURJ", "TEMPERATJ_"),
            Variable::Humidity => ("HUMIDITEJ", "HUMIDITEJ_"),
        };

        if day.is_current() {
            format!("{}0", current)
        } else {
            format!("{}{}", history, day.days_ago())
        }
    }

    /// All seven column names, oldest day first.
    pub fn column_names(&self) -> Vec<String> {
        DayOffset::window().map(|day| self.column_name(day)).collect()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Variable {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "precipitation" | "prec" => Ok(Variable::Precipitation),
            "temperature" | "temp" => Ok(Variable::Temperature),
            "humidity" | "hum" => Ok(Variable::Humidity),
            other => Err(MapError::InvalidFormat(format!(
                "Unknown variable '{}'. Expected precipitation, temperature or humidity",
                other
            ))),
        }
    }
}

/// Station attributes averaged over the whole window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeanAttribute {
    #[serde(rename = "TEMPMOY")]
    MeanTemperature,
    #[serde(rename = "HUMIDITEMO")]
    MeanHumidity,
}

impl MeanAttribute {
    pub const ALL: [MeanAttribute; 2] = [MeanAttribute::MeanTemperature, MeanAttribute::MeanHumidity];

    pub fn column_name(&self) -> &'static str {
        match self {
            MeanAttribute::MeanTemperature => "TEMPMOY",
            MeanAttribute::MeanHumidity => "HUMIDITEMO",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MeanAttribute::MeanTemperature => "Mean temperature",
            MeanAttribute::MeanHumidity => "Mean humidity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MeanAttribute::MeanTemperature => "°C",
            MeanAttribute::MeanHumidity => "%",
        }
    }
}

impl fmt::Display for MeanAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for MeanAttribute {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "TEMPMOY" | "MEAN-TEMPERATURE" => Ok(MeanAttribute::MeanTemperature),
            "HUMIDITEMO" | "MEAN-HUMIDITY" => Ok(MeanAttribute::MeanHumidity),
            other => Err(MapError::InvalidFormat(format!(
                "Unknown mean attribute '{}'. Expected TEMPMOY or HUMIDITEMO",
                other
            ))),
        }
    }
}

/// Signed index into the 7-day window: 0 is the most recent day, -6 the oldest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct DayOffset(i8);

impl DayOffset {
    pub const OLDEST: i32 = -6;
    pub const CURRENT: i32 = 0;
    pub const WINDOW_LEN: usize = 7;

    pub fn new(offset: i32) -> Result<Self> {
        if (Self::OLDEST..=Self::CURRENT).contains(&offset) {
            Ok(Self(offset as i8))
        } else {
            Err(MapError::InvalidDayOffset(offset))
        }
    }

    pub fn current() -> Self {
        Self(0)
    }

    /// The full window in ascending order, -6 through 0.
    pub fn window() -> impl Iterator<Item = DayOffset> {
        (Self::OLDEST..=Self::CURRENT).map(|offset| DayOffset(offset as i8))
    }

    pub fn value(&self) -> i32 {
        self.0 as i32
    }

    /// Positional index into a weekly series (0 = J-6 … 6 = J0).
    pub fn index(&self) -> usize {
        (self.0 as i32 - Self::OLDEST) as usize
    }

    pub fn days_ago(&self) -> u32 {
        self.0.unsigned_abs() as u32
    }

    pub fn is_current(&self) -> bool {
        self.0 == 0
    }

    /// `J-3`, `J0`.
    pub fn label(&self) -> String {
        format!("J{}", self.0)
    }
}

impl fmt::Display for DayOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for DayOffset {
    type Error = MapError;

    fn try_from(value: i32) -> Result<Self> {
        DayOffset::new(value)
    }
}

impl From<DayOffset> for i32 {
    fn from(day: DayOffset) -> i32 {
        day.value()
    }
}

impl FromStr for DayOffset {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let offset = trimmed.parse::<i32>().map_err(|_| {
            MapError::InvalidFormat(format!("Invalid day offset: '{}'", trimmed))
        })?;
        DayOffset::new(offset)
    }
}

/// Identity of a single raster tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub variable: Variable,
    pub day: DayOffset,
}

impl TileKey {
    pub fn new(variable: Variable, day: DayOffset) -> Self {
        Self { variable, day }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.variable.code(), self.day)
    }
}

//! Fixed classification tables. The classifier, the legends and the frame
//! colorbar all read from here, so a threshold exists in exactly one place.

use crate::models::{Color, MeanAttribute, Variable, VisualEncoding};
use crate::utils::constants::MEAN_MARKER_RADIUS;

/// Values strictly below `upper` fall in this bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub upper: f64,
    pub encoding: VisualEncoding,
}

const fn bin(upper: f64, encoding: VisualEncoding) -> Bin {
    Bin { upper, encoding }
}

/// Ascending bins, first match wins; anything at or above the last
/// threshold gets `catch_all`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinTable {
    pub bins: &'static [Bin],
    pub catch_all: VisualEncoding,
    /// Lowest value the legend labels start from.
    pub floor: f64,
}

impl BinTable {
    pub fn lookup(&self, value: f64) -> VisualEncoding {
        self.bins
            .iter()
            .find(|b| value < b.upper)
            .map(|b| b.encoding)
            .unwrap_or(self.catch_all)
    }

    pub fn thresholds(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.upper).collect()
    }

    pub fn top(&self) -> f64 {
        self.bins.last().map(|b| b.upper).unwrap_or(self.floor)
    }

    /// The catch-all draws something no bounded bin draws.
    pub fn catch_all_is_distinct(&self) -> bool {
        self.bins.iter().all(|b| b.encoding != self.catch_all)
    }
}

// Daily markers: fixed hue per variable, radius grows with the bin.
// Values past the top threshold drop back to the second tier.

const PRECIPITATION_BINS: [Bin; 4] = [
    bin(22.0, VisualEncoding::marker(Color::BLUE, 1)),
    bin(46.0, VisualEncoding::marker(Color::BLUE, 2)),
    bin(72.0, VisualEncoding::marker(Color::BLUE, 3)),
    bin(100.0, VisualEncoding::marker(Color::BLUE, 4)),
];

const TEMPERATURE_BINS: [Bin; 4] = [
    bin(5.0, VisualEncoding::marker(Color::RED, 1)),
    bin(10.0, VisualEncoding::marker(Color::RED, 2)),
    bin(15.0, VisualEncoding::marker(Color::RED, 3)),
    bin(20.0, VisualEncoding::marker(Color::RED, 4)),
];

const HUMIDITY_BINS: [Bin; 4] = [
    bin(12.0, VisualEncoding::marker(Color::GREEN, 1)),
    bin(25.0, VisualEncoding::marker(Color::GREEN, 2)),
    bin(38.0, VisualEncoding::marker(Color::GREEN, 3)),
    bin(50.0, VisualEncoding::marker(Color::GREEN, 4)),
];

pub fn daily_table(variable: Variable) -> BinTable {
    let (bins, hue): (&'static [Bin], Color) = match variable {
        Variable::Precipitation => (&PRECIPITATION_BINS, Color::BLUE),
        Variable::Temperature => (&TEMPERATURE_BINS, Color::RED),
        Variable::Humidity => (&HUMIDITY_BINS, Color::GREEN),
    };

    BinTable {
        bins,
        catch_all: VisualEncoding::marker(hue, 2),
        floor: domain(variable).0,
    }
}

const TEMPMOY_BINS: [Bin; 3] = [
    bin(19.4, VisualEncoding::marker(Color::rgb(0xfc, 0xc5, 0xc0), MEAN_MARKER_RADIUS)),
    bin(21.9, VisualEncoding::marker(Color::rgb(0xdf, 0x65, 0xb0), MEAN_MARKER_RADIUS)),
    bin(25.0, VisualEncoding::marker(Color::rgb(0xce, 0x12, 0x56), MEAN_MARKER_RADIUS)),
];

const HUMIDITEMO_BINS: [Bin; 4] = [
    bin(21.9, VisualEncoding::marker(Color::rgb(0xff, 0xff, 0xcc), MEAN_MARKER_RADIUS)),
    bin(31.5, VisualEncoding::marker(Color::rgb(0xa1, 0xda, 0xb4), MEAN_MARKER_RADIUS)),
    bin(35.7, VisualEncoding::marker(Color::rgb(0x41, 0xb6, 0xc4), MEAN_MARKER_RADIUS)),
    bin(40.6, VisualEncoding::marker(Color::rgb(0x22, 0x5e, 0xa8), MEAN_MARKER_RADIUS)),
];

pub fn mean_table(attribute: MeanAttribute) -> BinTable {
    match attribute {
        MeanAttribute::MeanTemperature => BinTable {
            bins: &TEMPMOY_BINS,
            catch_all: VisualEncoding::marker(Color::RED, MEAN_MARKER_RADIUS),
            floor: 17.6,
        },
        MeanAttribute::MeanHumidity => BinTable {
            bins: &HUMIDITEMO_BINS,
            catch_all: VisualEncoding::marker(Color::rgb(0xe3, 0x1a, 0x1c), MEAN_MARKER_RADIUS),
            floor: 18.7,
        },
    }
}

/// Display domain of the continuous raster ramp.
pub fn domain(variable: Variable) -> (f64, f64) {
    match variable {
        Variable::Precipitation => (0.0, 100.0),
        Variable::Temperature => (0.0, 20.0),
        Variable::Humidity => (0.0, 50.0),
    }
}

pub const RAMP_LOW: Color = Color::WHITE;
pub const RAMP_HIGH: Color = Color::BLUE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_ascend() {
        let tables = Variable::ALL
            .iter()
            .map(|&v| daily_table(v))
            .chain(MeanAttribute::ALL.iter().map(|&a| mean_table(a)));

        for table in tables {
            let thresholds = table.thresholds();
            assert!(thresholds.windows(2).all(|w| w[0] < w[1]), "{:?}", thresholds);
            assert!(table.floor < thresholds[0]);
        }
    }

    #[test]
    fn test_lookup_is_strictly_below() {
        let table = daily_table(Variable::Temperature);
        assert_eq!(table.lookup(4.99).radius, Some(1));
        assert_eq!(table.lookup(5.0).radius, Some(2));
        assert_eq!(table.lookup(19.99).radius, Some(4));
        assert_eq!(table.lookup(20.0), table.catch_all);
    }

    #[test]
    fn test_catch_all_distinctness() {
        assert!(!daily_table(Variable::Humidity).catch_all_is_distinct());
        assert!(mean_table(MeanAttribute::MeanTemperature).catch_all_is_distinct());
        assert!(mean_table(MeanAttribute::MeanHumidity).catch_all_is_distinct());
    }
}

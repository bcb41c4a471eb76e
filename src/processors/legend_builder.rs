use crate::models::{Legend, LegendEntry, Swatch, VisualEncoding};
use crate::processors::bin_table::{self, BinTable, RAMP_HIGH, RAMP_LOW};
use crate::processors::classifier::Scheme;

/// Legend for a scheme, read from the same tables the classifier uses.
pub fn build_legend(scheme: Scheme) -> Legend {
    match scheme {
        Scheme::RasterRamp(variable) => {
            let (min, max) = bin_table::domain(variable);
            Legend {
                caption: format!(
                    "Legend - Min: {}, Max: {} ({})",
                    min,
                    max,
                    variable.display_name()
                ),
                entries: vec![
                    LegendEntry {
                        label: format!("{} {}", min, variable.unit()),
                        swatch: Swatch::Ramp { color: RAMP_LOW },
                        threshold: Some(min),
                    },
                    LegendEntry {
                        label: format!("{} {}", max, variable.unit()),
                        swatch: Swatch::Ramp { color: RAMP_HIGH },
                        threshold: Some(max),
                    },
                ],
            }
        }
        Scheme::DailyMarker(variable) => {
            let table = bin_table::daily_table(variable);
            Legend {
                caption: format!("{} in {}", variable.display_name(), variable.unit()),
                entries: threshold_entries(&table),
            }
        }
        Scheme::MeanAttribute(attribute) => {
            let table = bin_table::mean_table(attribute);
            Legend {
                caption: format!("{} in {}", attribute.display_name(), attribute.unit()),
                entries: range_entries(&table),
            }
        }
    }
}

fn circle(encoding: VisualEncoding) -> Swatch {
    Swatch::Circle {
        color: encoding.color,
        radius: encoding.radius.unwrap_or(1),
    }
}

/// One entry per bounded bin, labelled with its upper threshold.
fn threshold_entries(table: &BinTable) -> Vec<LegendEntry> {
    let mut entries: Vec<LegendEntry> = table
        .bins
        .iter()
        .map(|bin| LegendEntry {
            label: format!("{}", bin.upper),
            swatch: circle(bin.encoding),
            threshold: Some(bin.upper),
        })
        .collect();

    if table.catch_all_is_distinct() {
        entries.push(catch_all_entry(table));
    }
    entries
}

/// `[low-high]` per bin, starting from the table floor.
fn range_entries(table: &BinTable) -> Vec<LegendEntry> {
    let mut low = table.floor;
    let mut entries = Vec::with_capacity(table.bins.len() + 1);

    for bin in table.bins {
        entries.push(LegendEntry {
            label: format!("[{}-{}]", low, bin.upper),
            swatch: circle(bin.encoding),
            threshold: Some(bin.upper),
        });
        low = bin.upper;
    }

    if table.catch_all_is_distinct() {
        entries.push(catch_all_entry(table));
    }
    entries
}

fn catch_all_entry(table: &BinTable) -> LegendEntry {
    LegendEntry {
        label: format!("≥ {}", table.top()),
        swatch: circle(table.catch_all),
        threshold: None,
    }
}

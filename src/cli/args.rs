use crate::error::MapError;
use crate::models::{DayOffset, MeanAttribute, Variable};
use crate::processors::OverlayStyle;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "clima-maps")]
#[command(about = "Climate raster overlays, station maps and timelapses for a 7-day window")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: clima-maps.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render one day of a variable as a georeferenced PNG overlay
    Overlay {
        #[arg(long, value_parser = parse_variable)]
        variable: Variable,

        #[arg(short, long, value_parser = parse_day, allow_hyphen_values = true, default_value = "0")]
        day: DayOffset,

        #[arg(
            short,
            long,
            help = "Output PNG path [default: {output}/{code}{day}-overlay.png]"
        )]
        output: Option<PathBuf>,

        #[arg(long, value_enum, help = "Pixel coloring [default: from settings]")]
        style: Option<StyleArg>,
    },

    /// Render two days of a variable side by side
    Compare {
        #[arg(long, value_parser = parse_variable)]
        variable: Variable,

        #[arg(long, value_parser = parse_day, allow_hyphen_values = true)]
        first: DayOffset,

        #[arg(long, value_parser = parse_day, allow_hyphen_values = true)]
        second: DayOffset,

        #[arg(long, help = "Output directory [default: from settings]")]
        output_dir: Option<PathBuf>,

        #[arg(long, value_enum)]
        style: Option<StyleArg>,
    },

    /// Animate J-6 through J0 of a variable as a looping GIF
    Timelapse {
        #[arg(long, value_parser = parse_variable)]
        variable: Variable,

        #[arg(
            short,
            long,
            help = "Output GIF path [default: {output}/{variable}_timelapse.gif]"
        )]
        output: Option<PathBuf>,

        #[arg(long, help = "Hide the frame progress bar")]
        quiet: bool,
    },

    /// Print or save the legend of a classification scheme
    Legend {
        #[arg(long, value_parser = parse_variable)]
        variable: Option<Variable>,

        #[arg(long, help = "Station marker bins instead of the raster ramp")]
        daily: bool,

        #[arg(short, long, value_parser = parse_attribute, conflicts_with_all = ["variable", "daily"])]
        attribute: Option<MeanAttribute>,

        #[arg(short, long, help = "Write JSON here instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Classify every station into a map scene
    Stations {
        #[command(subcommand)]
        map: StationMap,

        #[arg(long, global = true, help = "Station dataset [default: from settings]")]
        dataset: Option<PathBuf>,

        #[arg(short, long, global = true, help = "Scene JSON path")]
        output: Option<PathBuf>,
    },

    /// Filter stations by region, attribute value and distance
    Query {
        #[arg(long)]
        dataset: Option<PathBuf>,

        #[arg(short, long)]
        region: Option<String>,

        #[arg(long, value_parser = parse_variable)]
        variable: Option<Variable>,

        #[arg(
            short,
            long,
            value_parser = parse_day,
            allow_hyphen_values = true,
            help = "Day to compare; every day of the variable when omitted"
        )]
        day: Option<DayOffset>,

        #[arg(long, conflicts_with_all = ["variable", "day"], help = "Exact column name, e.g. PRECIPITATJ0")]
        column: Option<String>,

        #[arg(long, default_value = "", allow_hyphen_values = true, help = "Value to match; empty means 0")]
        value: String,

        #[arg(long, allow_hyphen_values = true, help = "Only stations within this many km of --near")]
        within_km: Option<String>,

        #[arg(long, requires = "within_km", help = "\"lat, lon\" center for --within-km")]
        near: Option<String>,

        #[arg(
            long,
            default_value = "0",
            allow_hyphen_values = true,
            help = "Buffer radius in km drawn around matches"
        )]
        radius: String,

        #[arg(short, long, help = "Scene JSON path")]
        output: Option<PathBuf>,

        #[arg(long, help = "Also export matching stations to Parquet")]
        export: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,
    },

    /// Highlight a "lat, lon" position on the station map
    Search {
        #[arg(long)]
        dataset: Option<PathBuf>,

        #[arg(short, long, allow_hyphen_values = true)]
        point: String,

        #[arg(short, long, help = "Scene JSON path")]
        output: Option<PathBuf>,
    },

    /// Line chart of one station's week
    Chart {
        #[arg(long)]
        dataset: Option<PathBuf>,

        #[arg(short, long)]
        station: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display information about a station dataset
    Info {
        #[arg(long)]
        dataset: Option<PathBuf>,

        #[arg(short, long, default_value = "5")]
        sample: usize,
    },
}

#[derive(Subcommand)]
pub enum StationMap {
    /// Stations sized and colored by one day's value
    Daily {
        #[arg(long, value_parser = parse_variable)]
        variable: Variable,

        #[arg(short, long, value_parser = parse_day, allow_hyphen_values = true, default_value = "0")]
        day: DayOffset,
    },

    /// Stations colored by a weekly mean
    Mean {
        #[arg(short, long, value_parser = parse_attribute)]
        attribute: MeanAttribute,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    Opacity,
    Ramp,
}

impl From<StyleArg> for OverlayStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Opacity => OverlayStyle::Opacity,
            StyleArg::Ramp => OverlayStyle::Ramp,
        }
    }
}

fn parse_with<T: FromStr<Err = MapError>>(s: &str) -> Result<T, String> {
    s.parse().map_err(|e: MapError| e.to_string())
}

fn parse_variable(s: &str) -> Result<Variable, String> {
    parse_with(s)
}

fn parse_day(s: &str) -> Result<DayOffset, String> {
    parse_with(s)
}

fn parse_attribute(s: &str) -> Result<MeanAttribute, String> {
    parse_with(s)
}

use crate::cli::args::{Cli, Commands, StationMap, StyleArg};
use crate::config::Settings;
use crate::error::{MapError, Result};
use crate::models::{DayOffset, MeanAttribute, StationColumn, StationRecord, Variable};
use crate::processors::spatial_query::{
    filter_by_attribute, filter_by_region, filter_by_variable, parse_filter_value, parse_radius,
    regions, within_radius,
};
use crate::processors::{
    build_legend, daily_map, mean_map, query_map, render, Artifact, MapScene, OverlayStyle,
    PlotFrameRenderer, RenderContext, RenderRequest, Scheme, StationChart,
};
use crate::readers::{StationDataset, StationReader, TileRouter};
use crate::utils::filename::{
    daily_scene_stem, default_chart_filename, default_overlay_filename, default_scene_filename,
    default_timelapse_filename, mean_scene_stem,
};
use crate::utils::parse_lat_lon;
use crate::writers::{
    cleanup_stale_areas, write_comparison, write_json, write_overlay, write_png, write_timelapse,
    StationParquetWriter, TransientArea,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    let settings = Settings::load(cli.config.as_deref())?;
    tracing::debug!("Settings: {:?}", settings);

    // Tile and dataset I/O is blocking; keep it off the async workers.
    let command = cli.command;
    tokio::task::spawn_blocking(move || execute(command, &settings)).await?
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Logging was already initialized");
    }
    Ok(())
}

pub fn execute(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Overlay {
            variable,
            day,
            output,
            style,
        } => {
            let store = TileRouter::from_settings(&settings.tiles)?;
            let renderer = frame_renderer(settings);
            let ctx = render_context(&store, &renderer, settings, style, false);

            match render(&RenderRequest::single(variable, day), &ctx)? {
                Artifact::Overlay { overlay, legend } => {
                    let path = output.unwrap_or_else(|| {
                        default_overlay_filename(&settings.output.dir, variable, day)
                    });
                    let written = write_overlay(&overlay, &legend, &path)?;
                    println!(
                        "{} day {} overlay ({}x{}) written to {}",
                        variable,
                        day,
                        overlay.image.width(),
                        overlay.image.height(),
                        written.image.display()
                    );
                    println!("Metadata: {}", written.sidecar.display());
                    println!("{}", legend.caption);
                }
                other => return Err(unexpected_artifact(&other)),
            }
        }

        Commands::Compare {
            variable,
            first,
            second,
            output_dir,
            style,
        } => {
            let store = TileRouter::from_settings(&settings.tiles)?;
            let renderer = frame_renderer(settings);
            let ctx = render_context(&store, &renderer, settings, style, false);

            match render(&RenderRequest::compare(variable, first, second), &ctx)? {
                Artifact::Comparison(comparison) => {
                    let dir = output_dir.unwrap_or_else(|| settings.output.dir.clone());
                    let (left, right) = write_comparison(&comparison, &dir)?;
                    println!("Comparing {} day {} and day {}", variable, first, second);
                    println!("  {}", left.image.display());
                    println!("  {}", right.image.display());
                    println!("{}", comparison.legend.caption);
                }
                other => return Err(unexpected_artifact(&other)),
            }
        }

        Commands::Timelapse {
            variable,
            output,
            quiet,
        } => {
            let transient_root = std::env::temp_dir();
            let stale_after = Duration::from_secs(settings.output.stale_after_secs);
            if let Err(e) = cleanup_stale_areas(&transient_root, stale_after) {
                tracing::warn!("Could not sweep stale transient areas: {}", e);
            }

            let store = TileRouter::from_settings(&settings.tiles)?;
            let renderer = frame_renderer(settings);
            let ctx = render_context(&store, &renderer, settings, None, !quiet);

            match render(&RenderRequest::timelapse(variable), &ctx)? {
                Artifact::Timelapse(outcome) => {
                    let path = output.unwrap_or_else(|| {
                        default_timelapse_filename(&settings.output.dir, variable)
                    });
                    let area = TransientArea::in_dir(&transient_root)?;
                    write_timelapse(&outcome.artifact, &area, &path)?;
                    area.close()?;

                    let days: Vec<String> =
                        outcome.artifact.days().iter().map(|d| d.label()).collect();
                    println!(
                        "{} timelapse written to {} ({} frame(s): {})",
                        variable,
                        path.display(),
                        days.len(),
                        days.join(", ")
                    );
                    for failure in &outcome.failures {
                        println!("  skipped {}: {}", failure.subject, failure.error);
                    }
                }
                other => return Err(unexpected_artifact(&other)),
            }
        }

        Commands::Legend {
            variable,
            daily,
            attribute,
            output,
        } => {
            let scheme = legend_scheme(variable, daily, attribute)?;
            let legend = build_legend(scheme);
            match output {
                Some(path) => {
                    write_json(&legend, &path)?;
                    println!("{} legend written to {}", scheme, path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&legend)?),
            }
        }

        Commands::Stations {
            map,
            dataset,
            output,
        } => {
            let dataset = load_dataset(dataset, settings)?;
            let (outcome, stem) = match map {
                StationMap::Daily { variable, day } => (
                    daily_map(&dataset.records, variable, day),
                    daily_scene_stem(variable, day),
                ),
                StationMap::Mean { attribute } => (
                    mean_map(&dataset.records, attribute),
                    mean_scene_stem(attribute),
                ),
            };

            let path =
                output.unwrap_or_else(|| default_scene_filename(&settings.output.dir, &stem));
            write_json(&outcome.scene, &path)?;
            println!(
                "{} of {} station(s) classified, scene written to {}",
                outcome.scene.markers.len(),
                dataset.len(),
                path.display()
            );
            if !outcome.failures.is_empty() {
                println!("{} station(s) without a usable value", outcome.failures.len());
            }
        }

        Commands::Query {
            dataset,
            region,
            variable,
            day,
            column,
            value,
            within_km,
            near,
            radius,
            output,
            export,
            compression,
        } => {
            // Malformed input fails before anything is read.
            let value = parse_filter_value(&value)?;
            let radius = parse_radius(&radius)?;
            let column = column
                .map(|name| name.parse::<StationColumn>())
                .transpose()?;
            let proximity = match (within_km, near) {
                (Some(km), Some(center)) => Some((parse_radius(&km)?, parse_lat_lon(&center)?)),
                (None, None) => None,
                _ => {
                    return Err(MapError::InvalidRequest(
                        "--within-km and --near must be given together".to_string(),
                    ))
                }
            };
            let attribute_filter = query_filter(column, variable, day)?;

            let dataset = load_dataset(dataset, settings)?;
            let mut matched: Vec<&StationRecord> = dataset.records.iter().collect();

            if let Some(region) = &region {
                matched = filter_by_region(matched, region);
            }
            matched = match attribute_filter {
                QueryFilter::Column(column) => filter_by_attribute(matched, column, value),
                QueryFilter::Variable(variable, day) => {
                    filter_by_variable(matched, variable, day, value)
                }
                QueryFilter::None => matched,
            };
            if let Some((km, center)) = proximity {
                matched = within_radius(matched, center, km)?;
            }

            let scene = query_map(&matched, radius)?;
            let path =
                output.unwrap_or_else(|| default_scene_filename(&settings.output.dir, "query"));
            write_json(&scene, &path)?;

            println!("{} of {} station(s) matched", matched.len(), dataset.len());
            for record in &matched {
                println!(
                    "  #{} {} ({:.4}, {:.4})",
                    record.id, record.region, record.latitude, record.longitude
                );
            }
            println!("Scene written to {}", path.display());

            if let Some(export) = export {
                let writer = StationParquetWriter::new().with_compression(&compression)?;
                let records: Vec<StationRecord> = matched.iter().map(|r| (*r).clone()).collect();
                if let Some(parent) = export.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                writer.write_records(&records, &export)?;
                println!("\n{}", writer.get_file_info(&export)?.summary());
            }
        }

        Commands::Search {
            dataset,
            point,
            output,
        } => {
            let dataset = load_dataset(dataset, settings)?;
            let base = MapScene::station_points(&dataset.records);

            let scene = match base.clone().with_search(&point) {
                Ok(scene) => scene,
                Err(MapError::InvalidCoordinateFormat(reason)) => {
                    tracing::warn!("Ignoring search '{}': {}", point, reason);
                    println!("Invalid coordinates, showing every station instead");
                    base
                }
                Err(e) => return Err(e),
            };

            let path =
                output.unwrap_or_else(|| default_scene_filename(&settings.output.dir, "search"));
            write_json(&scene, &path)?;
            println!(
                "{} station(s){} written to {}",
                scene.markers.len(),
                if scene.highlight.is_some() {
                    " and the searched point"
                } else {
                    ""
                },
                path.display()
            );
        }

        Commands::Chart {
            dataset,
            station,
            output,
        } => {
            let dataset = load_dataset(dataset, settings)?;
            let record = dataset
                .records
                .iter()
                .find(|r| r.id == station)
                .ok_or_else(|| {
                    MapError::InvalidRequest(format!(
                        "No station {} in a dataset of {} record(s)",
                        station,
                        dataset.len()
                    ))
                })?;

            let image = StationChart::default().render(record)?;
            let path =
                output.unwrap_or_else(|| default_chart_filename(&settings.output.dir, station));
            write_png(&image, &path)?;
            println!("Chart for station {} written to {}", station, path.display());
        }

        Commands::Info { dataset, sample } => {
            let path = dataset.unwrap_or_else(|| settings.dataset.path.clone());
            let data = StationReader::new().read(&path)?;
            let file_info = StationParquetWriter::new().get_file_info(&path)?;

            println!("Station dataset: {}", path.display());
            match data.date {
                Some(date) => println!("Date (J0): {}", date),
                None => println!("Date (J0): unknown"),
            }
            println!("Stations: {} ({} skipped)", data.len(), data.failures.len());
            println!("Regions: {}", regions(&data.records).join(", "));
            println!("\n{}", file_info.summary());

            if sample > 0 && !data.is_empty() {
                println!("\nSample stations:");
                for record in data.records.iter().take(sample) {
                    println!(
                        "  #{} {} ({:.4}, {:.4}) {}: {:.1}°C, {}: {:.1}%",
                        record.id,
                        record.region,
                        record.latitude,
                        record.longitude,
                        MeanAttribute::MeanTemperature,
                        record.mean_temperature,
                        MeanAttribute::MeanHumidity,
                        record.mean_humidity
                    );
                }
            }
            for failure in data.failures.iter().take(sample) {
                println!("  skipped {}: {}", failure.subject, failure.error);
            }
        }
    }

    Ok(())
}

enum QueryFilter {
    Column(StationColumn),
    Variable(Variable, Option<DayOffset>),
    None,
}

fn query_filter(
    column: Option<StationColumn>,
    variable: Option<Variable>,
    day: Option<DayOffset>,
) -> Result<QueryFilter> {
    match (column, variable, day) {
        (Some(column), _, _) => Ok(QueryFilter::Column(column)),
        (None, Some(variable), day) => Ok(QueryFilter::Variable(variable, day)),
        (None, None, Some(_)) => Err(MapError::InvalidRequest(
            "--day needs --variable".to_string(),
        )),
        (None, None, None) => Ok(QueryFilter::None),
    }
}

fn legend_scheme(
    variable: Option<Variable>,
    daily: bool,
    attribute: Option<MeanAttribute>,
) -> Result<Scheme> {
    match (attribute, variable) {
        (Some(attribute), _) => Ok(Scheme::MeanAttribute(attribute)),
        (None, Some(variable)) if daily => Ok(Scheme::DailyMarker(variable)),
        (None, Some(variable)) => Ok(Scheme::RasterRamp(variable)),
        (None, None) => Err(MapError::InvalidRequest(
            "Pass --variable or --attribute".to_string(),
        )),
    }
}

fn load_dataset(path: Option<PathBuf>, settings: &Settings) -> Result<StationDataset> {
    let path = path.unwrap_or_else(|| settings.dataset.path.clone());
    let dataset = StationReader::new().read(&path)?;
    for failure in &dataset.failures {
        tracing::warn!("Skipped {}: {}", failure.subject, failure.error);
    }
    Ok(dataset)
}

fn frame_renderer(settings: &Settings) -> PlotFrameRenderer {
    PlotFrameRenderer::new(settings.output.frame_width, settings.output.frame_height)
}

fn render_context<'a>(
    store: &'a TileRouter,
    renderer: &'a PlotFrameRenderer,
    settings: &Settings,
    style: Option<StyleArg>,
    show_progress: bool,
) -> RenderContext<'a> {
    RenderContext {
        store,
        renderer,
        style: style
            .map(OverlayStyle::from)
            .unwrap_or(settings.output.overlay_style),
        show_progress,
    }
}

fn unexpected_artifact(artifact: &Artifact) -> MapError {
    let kind = match artifact {
        Artifact::Overlay { .. } => "overlay",
        Artifact::Comparison(_) => "comparison",
        Artifact::Timelapse(_) => "timelapse",
    };
    MapError::Render(format!("Unexpected {} artifact", kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legend_scheme_selection() -> Result<()> {
        assert_eq!(
            legend_scheme(None, false, Some(MeanAttribute::MeanTemperature))?,
            Scheme::MeanAttribute(MeanAttribute::MeanTemperature)
        );
        assert_eq!(
            legend_scheme(Some(Variable::Humidity), true, None)?,
            Scheme::DailyMarker(Variable::Humidity)
        );
        assert_eq!(
            legend_scheme(Some(Variable::Humidity), false, None)?,
            Scheme::RasterRamp(Variable::Humidity)
        );
        assert!(legend_scheme(None, true, None).is_err());
        Ok(())
    }

    #[test]
    fn test_query_filter_needs_variable_for_day() {
        assert!(query_filter(None, None, Some(DayOffset::current())).is_err());
        assert!(matches!(
            query_filter(None, Some(Variable::Precipitation), None),
            Ok(QueryFilter::Variable(Variable::Precipitation, None))
        ));
        assert!(matches!(query_filter(None, None, None), Ok(QueryFilter::None)));
    }
}

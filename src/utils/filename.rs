use crate::models::{DayOffset, MeanAttribute, Variable};
use std::path::{Path, PathBuf};

/// Default overlay image path: `{output}/{code}{day}-overlay.png`
pub fn default_overlay_filename(output_dir: &Path, variable: Variable, day: DayOffset) -> PathBuf {
    output_dir.join(format!("{}{}-overlay.png", variable.code(), day))
}

/// One side of a comparison: `{output}/{code}{day}-overlay-{side}.png`
pub fn comparison_overlay_filename(
    output_dir: &Path,
    variable: Variable,
    day: DayOffset,
    side: &str,
) -> PathBuf {
    output_dir.join(format!("{}{}-overlay-{}.png", variable.code(), day, side))
}

/// Default timelapse path: `{output}/{variable}_timelapse.gif`
pub fn default_timelapse_filename(output_dir: &Path, variable: Variable) -> PathBuf {
    output_dir.join(format!(
        "{}_timelapse.gif",
        variable.display_name().to_lowercase()
    ))
}

/// Default scene path for daily or mean station maps.
pub fn default_scene_filename(output_dir: &Path, stem: &str) -> PathBuf {
    output_dir.join(format!("{}-scene.json", stem))
}

pub fn daily_scene_stem(variable: Variable, day: DayOffset) -> String {
    variable.column_name(day).to_lowercase()
}

pub fn mean_scene_stem(attribute: MeanAttribute) -> String {
    attribute.column_name().to_lowercase()
}

/// Default station chart path: `{output}/station-{id}-chart.png`
pub fn default_chart_filename(output_dir: &Path, station_id: usize) -> PathBuf {
    output_dir.join(format!("station-{}-chart.png", station_id))
}

/// JSON sidecar living next to an image: `a/b.png` -> `a/b.json`
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_filename() {
        let path = default_overlay_filename(
            Path::new("output"),
            Variable::Temperature,
            DayOffset::new(-1).unwrap(),
        );
        assert_eq!(path, PathBuf::from("output/temp-1-overlay.png"));
        assert_eq!(
            sidecar_path(&path),
            PathBuf::from("output/temp-1-overlay.json")
        );
    }

    #[test]
    fn test_comparison_sides_differ() {
        let day = DayOffset::new(-2).unwrap();
        let left = comparison_overlay_filename(Path::new("out"), Variable::Precipitation, day, "left");
        let right = comparison_overlay_filename(Path::new("out"), Variable::Precipitation, day, "right");
        assert_eq!(left, PathBuf::from("out/prec-2-overlay-left.png"));
        assert_ne!(left, right);
    }

    #[test]
    fn test_timelapse_filename() {
        let path = default_timelapse_filename(Path::new("output"), Variable::Humidity);
        assert_eq!(path, PathBuf::from("output/humidity_timelapse.gif"));
    }

    #[test]
    fn test_scene_stems() {
        assert_eq!(
            daily_scene_stem(Variable::Precipitation, DayOffset::current()),
            "precipitatj0"
        );
        assert_eq!(mean_scene_stem(MeanAttribute::MeanHumidity), "humiditemo");
        assert_eq!(
            default_scene_filename(Path::new("out"), "tempmoy"),
            PathBuf::from("out/tempmoy-scene.json")
        );
    }
}

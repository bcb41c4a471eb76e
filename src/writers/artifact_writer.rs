//! Disk output for rendered artifacts: PNG overlays with JSON sidecars,
//! GIF timelapses, scene and legend JSON, station charts.

use crate::error::{MapError, Result};
use crate::models::{ComparisonArtifact, Legend, OverlayArtifact, TimelapseArtifact};
use crate::utils::filename::{comparison_overlay_filename, sidecar_path};
use crate::writers::transient::TransientArea;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, ImageFormat, RgbaImage};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Paths produced for one overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOverlay {
    pub image: PathBuf,
    pub sidecar: PathBuf,
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub fn write_png(image: &RgbaImage, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    image.save_with_format(path, ImageFormat::Png)?;
    tracing::debug!(
        "Wrote {}x{} PNG to {}",
        image.width(),
        image.height(),
        path.display()
    );
    Ok(())
}

/// Pretty-printed JSON, creating parent directories as needed.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Overlay PNG at `path` plus its metadata sidecar next to it.
pub fn write_overlay(overlay: &OverlayArtifact, legend: &Legend, path: &Path) -> Result<WrittenOverlay> {
    write_png(&overlay.image, path)?;
    let sidecar = sidecar_path(path);
    write_json(&overlay.metadata(legend), &sidecar)?;

    Ok(WrittenOverlay {
        image: path.to_path_buf(),
        sidecar,
    })
}

/// Both sides of a comparison in `output_dir`, suffixed `-left` and
/// `-right` so comparing a day with itself still yields two files.
pub fn write_comparison(
    comparison: &ComparisonArtifact,
    output_dir: &Path,
) -> Result<(WrittenOverlay, WrittenOverlay)> {
    let write_side = |overlay: &OverlayArtifact, side: &str| {
        let path = comparison_overlay_filename(output_dir, overlay.variable, overlay.day, side);
        write_overlay(overlay, &comparison.legend, &path)
    };

    let left = write_side(&comparison.left, "left")?;
    let right = write_side(&comparison.right, "right")?;
    Ok((left, right))
}

/// Encode the frames as a looping GIF, one frame per `frame_delay_ms`.
pub fn encode_gif<W: Write>(artifact: &TimelapseArtifact, writer: W) -> Result<()> {
    if artifact.frames.is_empty() {
        return Err(MapError::EmptySequence {
            variable: artifact.variable.to_string(),
        });
    }

    let delay = Delay::from_numer_denom_ms(artifact.frame_delay_ms(), 1);
    let mut encoder = GifEncoder::new(writer);
    encoder
        .set_repeat(Repeat::Infinite)
        .map_err(|e| MapError::Encode(format!("GIF loop setting: {}", e)))?;

    for frame in &artifact.frames {
        encoder
            .encode_frame(Frame::from_parts(frame.image.clone(), 0, 0, delay))
            .map_err(|e| MapError::Encode(format!("GIF frame {}: {}", frame.day.label(), e)))?;
    }
    Ok(())
}

/// Encode inside `area`, then copy the finished animation to `output`.
/// A partial GIF never reaches `output`.
pub fn write_timelapse(
    artifact: &TimelapseArtifact,
    area: &TransientArea,
    output: &Path,
) -> Result<PathBuf> {
    let staged = area.file(&format!("{}.gif", artifact.variable.code()));
    {
        let mut writer = BufWriter::new(File::create(&staged)?);
        encode_gif(artifact, &mut writer)?;
        writer.flush()?;
    }

    ensure_parent(output)?;
    let bytes = std::fs::copy(&staged, output)?;
    tracing::info!(
        "Timelapse of {} frame(s) written to {} ({} bytes)",
        artifact.frames.len(),
        output.display(),
        bytes
    );
    Ok(output.to_path_buf())
}

use crate::error::{MapError, Result};
use crate::utils::constants::TRANSIENT_PREFIX;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Request-scoped scratch directory for timelapse encoding. Removed when
/// dropped; areas left behind by crashed runs are swept by
/// [`cleanup_stale_areas`].
pub struct TransientArea {
    dir: TempDir,
}

impl TransientArea {
    pub fn new() -> Result<Self> {
        Self::in_dir(&std::env::temp_dir())
    }

    pub fn in_dir(parent: &Path) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(TRANSIENT_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| {
                MapError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create transient directory in {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        tracing::debug!("Transient area at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the directory now and report failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}

/// Delete transient areas under `parent` older than `max_age`. Returns how
/// many were removed; an area that cannot be removed is logged and kept.
pub fn cleanup_stale_areas(parent: &Path, max_age: Duration) -> Result<usize> {
    let mut removed = 0;

    for entry in std::fs::read_dir(parent)? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(TRANSIENT_PREFIX) {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_dir() {
            continue;
        }

        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| modified.elapsed().ok());
        if !matches!(age, Some(age) if age >= max_age) {
            continue;
        }

        match std::fs::remove_dir_all(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!(
                "Could not remove stale transient area {}: {}",
                entry.path().display(),
                e
            ),
        }
    }

    if removed > 0 {
        tracing::info!("Removed {} stale transient area(s)", removed);
    }
    Ok(removed)
}

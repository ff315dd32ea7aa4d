//! The three visual layers and the cleanup handle for job temporaries.

pub mod background;
pub mod clip;
pub mod disc;

use std::path::{Path, PathBuf};

/// Owns temporary files created for one job and removes them exactly once, either through
/// [`LayerCleanup::release`] or on drop.
#[derive(Debug, Default)]
pub struct LayerCleanup {
    paths: Vec<PathBuf>,
    released: bool,
}

impl LayerCleanup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `path`; it will be deleted on release.
    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn tracked(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Delete every tracked file. Returns how many files were removed; later calls are no-ops.
    pub fn release(&mut self) -> usize {
        if self.released {
            return 0;
        }
        self.released = true;
        let mut removed = 0;
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove temporary file");
                }
            }
        }
        tracing::debug!(removed, "released job temporaries");
        removed
    }
}

impl Drop for LayerCleanup {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/cleanup.rs"]
mod tests;

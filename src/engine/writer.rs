//! Writes rendered override documents into a flat working directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

/// Character that replaces `/` when a chart-relative path is flattened.
pub const FLATTEN_CHAR: char = '_';

/// Flatten a chart-relative path into a single file name.
pub fn flatten_path(relative: &str) -> String {
    relative.replace('/', &FLATTEN_CHAR.to_string())
}

/// Owns one working directory and the files written into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideWriter {
    work_dir: PathBuf,
}

impl OverrideWriter {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Destination for an override file: `<work_dir>/<relative with / replaced by _>`.
    pub fn output_path(&self, relative: &str) -> PathBuf {
        self.work_dir.join(flatten_path(relative))
    }

    /// Write `data` to `path`, creating parent directories and truncating any existing file.
    pub fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        debug!("wrote {} ({} bytes)", path.display(), data.len());
        Ok(())
    }

    /// Remove the working directory and everything in it. A missing directory is not an error.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_dir_all(&self.work_dir) {
            Ok(()) => {
                debug!("removed {}", self.work_dir.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

//! The mirror file: a copy of the last successful output on disk.

use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorFile {
    path: PathBuf,
}

impl MirrorFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the file with `content`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn write(&self, content: &[u8]) -> Result<()> {
        debug!("Mirroring {} bytes to `{}`", content.len(), self);

        fs::write(&self.path, content).map_err(|e| {
            Error::io_error(
                "output".to_string(),
                self.path.display().to_string(),
                e,
            )
        })
    }
}

impl Display for MirrorFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

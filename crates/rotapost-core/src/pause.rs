use crate::error::Result;
use std::path::{Path, PathBuf};

/// Durable "do not run" flag. Its presence is what matters; the text inside
/// is an advisory reason for the operator.
#[derive(Debug, Clone)]
pub struct PauseMarker {
    path: PathBuf,
}

impl PauseMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_paused(&self) -> bool {
        self.path.exists()
    }

    pub fn reason(&self) -> Result<Option<String>> {
        if !self.is_paused() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(Some(text.trim().to_string()))
    }

    pub fn pause(&self, reason: &str) -> Result<()> {
        crate::io::atomic_write(&self.path, reason.as_bytes())
    }

    /// Returns true if a marker was removed.
    pub fn resume(&self) -> Result<bool> {
        if !self.is_paused() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)?;
        Ok(true)
    }
}

use crate::error::{Result, RotapostError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const ROTAPOST_DIR: &str = ".rotapost";
pub const DATA_DIR: &str = ".rotapost/data";

pub const SETTINGS_FILE: &str = ".rotapost/settings.yaml";
pub const DESTINATIONS_FILE: &str = ".rotapost/destinations.yaml";
pub const CONTENT_FILE: &str = ".rotapost/content.yaml";
pub const PHOTOS_FILE: &str = ".rotapost/photos.yaml";
pub const SCHEDULE_FILE: &str = ".rotapost/schedule.yaml";
pub const RULES_FILE: &str = ".rotapost/rules.yaml";
pub const HISTORY_FILE: &str = ".rotapost/data/history.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn rotapost_dir(root: &Path) -> PathBuf {
    root.join(ROTAPOST_DIR)
}

pub fn data_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR)
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join(SETTINGS_FILE)
}

pub fn destinations_path(root: &Path) -> PathBuf {
    root.join(DESTINATIONS_FILE)
}

pub fn content_path(root: &Path) -> PathBuf {
    root.join(CONTENT_FILE)
}

pub fn photos_path(root: &Path) -> PathBuf {
    root.join(PHOTOS_FILE)
}

pub fn schedule_path(root: &Path) -> PathBuf {
    root.join(SCHEDULE_FILE)
}

pub fn rules_path(root: &Path) -> PathBuf {
    root.join(RULES_FILE)
}

pub fn history_path(root: &Path) -> PathBuf {
    root.join(HISTORY_FILE)
}

pub fn pause_path(root: &Path, pause_file: &str) -> PathBuf {
    data_dir(root).join(pause_file)
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9\-_]*[a-z0-9]$|^[a-z0-9]$").expect("id pattern is valid")
    })
}

/// Destination and content ids double as history keys, so they are kept to a
/// conservative character set.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !id_re().is_match(id) {
        return Err(RotapostError::InvalidId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

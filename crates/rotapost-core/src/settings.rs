use crate::eligibility::PromoCategories;
use crate::error::{Result, RotapostError};
use crate::paths;
use crate::photo::CategoryAdjacency;
use crate::types::FailurePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

impl ConfigWarning {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// PostingConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingConfig {
    #[serde(default = "default_max_posts")]
    pub max_posts_per_day: usize,
    #[serde(default = "default_min_posts")]
    pub min_posts_per_day: usize,
    #[serde(default = "default_min_delay")]
    pub min_delay_minutes: u64,
    #[serde(default = "default_max_delay")]
    pub max_delay_minutes: u64,
}

fn default_max_posts() -> usize {
    6
}

fn default_min_posts() -> usize {
    4
}

fn default_min_delay() -> u64 {
    20
}

fn default_max_delay() -> u64 {
    45
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            max_posts_per_day: default_max_posts(),
            min_posts_per_day: default_min_posts(),
            min_delay_minutes: default_min_delay(),
            max_delay_minutes: default_max_delay(),
        }
    }
}

// ---------------------------------------------------------------------------
// PhotoConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoConfig {
    /// Directory photo filenames are resolved against. Relative paths are
    /// relative to the project root.
    #[serde(default = "default_photo_base")]
    pub base_path: PathBuf,
}

fn default_photo_base() -> PathBuf {
    PathBuf::from("photos")
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            base_path: default_photo_base(),
        }
    }
}

// ---------------------------------------------------------------------------
// SafetyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default)]
    pub dry_run: bool,
    /// Failures in one cycle before the breaker trips and the pause marker
    /// is written.
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
    #[serde(default = "default_pause_file")]
    pub pause_file: String,
}

fn default_max_failures() -> u32 {
    3
}

fn default_pause_file() -> String {
    "paused.lock".to_string()
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_failures: default_max_failures(),
            pause_file: default_pause_file(),
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub promo_categories: PromoCategories,
    #[serde(default)]
    pub photo_adjacency: CategoryAdjacency,
    /// First-comment phrases for destinations that allow promotion. Rotated
    /// deterministically; empty disables follow-up comments.
    #[serde(default)]
    pub follow_up_comments: Vec<String>,
}

// ---------------------------------------------------------------------------
// Settings (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub posting: PostingConfig,
    #[serde(default)]
    pub photos: PhotoConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
}

impl Settings {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::settings_path(root);
        if !path.exists() {
            return Err(RotapostError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(&data)?;
        Ok(settings)
    }

    /// Photo base directory resolved against `root`.
    pub fn photo_base(&self, root: &Path) -> PathBuf {
        root.join(&self.photos.base_path)
    }

    pub fn pause_path(&self, root: &Path) -> PathBuf {
        paths::pause_path(root, &self.safety.pause_file)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let posting = &self.posting;

        if posting.max_posts_per_day == 0 {
            warnings.push(ConfigWarning::warning(
                "posting.max_posts_per_day is 0; no group will ever be posted to",
            ));
        }
        if posting.min_posts_per_day > posting.max_posts_per_day {
            warnings.push(ConfigWarning::warning(format!(
                "posting.min_posts_per_day ({}) exceeds max_posts_per_day ({})",
                posting.min_posts_per_day, posting.max_posts_per_day
            )));
        }
        if posting.min_delay_minutes > posting.max_delay_minutes {
            warnings.push(ConfigWarning::error(format!(
                "posting.min_delay_minutes ({}) exceeds max_delay_minutes ({})",
                posting.min_delay_minutes, posting.max_delay_minutes
            )));
        }
        if self.safety.max_failures == 0 {
            warnings.push(ConfigWarning::error(
                "safety.max_failures must be at least 1",
            ));
        }
        if self.safety.pause_file.trim().is_empty()
            || self.safety.pause_file.contains(&['/', '\\'][..])
        {
            warnings.push(ConfigWarning::error(format!(
                "safety.pause_file '{}' must be a plain file name",
                self.safety.pause_file
            )));
        }
        if self
            .selection
            .follow_up_comments
            .iter()
            .any(|c| c.trim().is_empty())
        {
            warnings.push(ConfigWarning::warning(
                "selection.follow_up_comments contains an empty phrase",
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

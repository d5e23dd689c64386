use crate::content::ContentItem;
use crate::error::{Result, RotapostError};
use crate::io;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Photo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub filename: String,
    pub category: String,
    #[serde(default)]
    pub used_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Photo {
    pub fn new(filename: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            category: category.into(),
            used_count: 0,
            description: None,
        }
    }
}

// ---------------------------------------------------------------------------
// CategoryAdjacency
// ---------------------------------------------------------------------------

/// Related photo categories to borrow from when an item's own category has no
/// photos. A category mapped to an empty list deliberately gets no photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryAdjacency(BTreeMap<String, Vec<String>>);

impl Default for CategoryAdjacency {
    fn default() -> Self {
        let mut m = BTreeMap::new();
        m.insert("tips".to_string(), Vec::new());
        m.insert("security".to_string(), Vec::new());
        m.insert("promo".to_string(), vec!["brand".to_string()]);
        m.insert("smart_home".to_string(), vec!["network".to_string()]);
        m.insert("data_recovery".to_string(), vec!["repairs".to_string()]);
        Self(m)
    }
}

impl CategoryAdjacency {
    pub fn new(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }

    pub fn related(&self, category: &str) -> &[String] {
        self.0.get(category).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// PhotoCatalog
// ---------------------------------------------------------------------------

fn parse_photos(data: &str) -> Result<Vec<Photo>> {
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let photos: Option<Vec<Photo>> = serde_yaml::from_str(data)?;
    Ok(photos.unwrap_or_default())
}

fn read_photos(path: &Path) -> Result<Vec<Photo>> {
    parse_photos(&std::fs::read_to_string(path)?)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoCatalog {
    photos: Vec<Photo>,
}

impl PhotoCatalog {
    pub fn new(photos: Vec<Photo>) -> Self {
        Self { photos }
    }

    /// A missing manifest is an empty catalog; every post is then text-only.
    ///
    /// An unreadable manifest falls back to its `.bak` copy. The primary's
    /// error is returned only when the backup is unusable too.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::photos_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let err = match read_photos(&path) {
            Ok(photos) => return Ok(Self::new(photos)),
            Err(e) => e,
        };
        tracing::warn!(path = %path.display(), error = %err, "photo manifest unreadable, trying backup");

        let backup = io::backup_path(&path);
        if backup.exists() {
            match read_photos(&backup) {
                Ok(photos) => {
                    tracing::warn!(path = %backup.display(), "photo manifest restored from backup");
                    return Ok(Self::new(photos));
                }
                Err(e) => {
                    tracing::warn!(path = %backup.display(), error = %e, "photo manifest backup unreadable");
                }
            }
        }
        Err(err)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::photos_path(root);
        let data = serde_yaml::to_string(&self.photos)?;
        io::atomic_write_with_backup(&path, data.as_bytes(), |current| {
            std::str::from_utf8(current).is_ok_and(|text| parse_photos(text).is_ok())
        })
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn get(&self, filename: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.filename == filename)
    }

    /// Photo to accompany `item`, if any.
    ///
    /// Curated suggestions win outright, first listed one present in the
    /// catalog. Otherwise the least-used photo of the item's category, or of
    /// its adjacent categories when its own has none. Ties go to the photo
    /// listed first.
    pub fn select(&self, item: &ContentItem, adjacency: &CategoryAdjacency) -> Option<&Photo> {
        if let Some(photo) = item.suggested_photos.iter().find_map(|f| self.get(f)) {
            return Some(photo);
        }

        let mut pool: Vec<&Photo> = self
            .photos
            .iter()
            .filter(|p| p.category == item.category)
            .collect();

        if pool.is_empty() {
            for related in adjacency.related(&item.category) {
                pool.extend(self.photos.iter().filter(|p| &p.category == related));
            }
        }

        pool.into_iter()
            .enumerate()
            .min_by_key(|(i, p)| (p.used_count, *i))
            .map(|(_, p)| p)
    }

    /// Increment a photo's usage counter in memory. Callers persist with
    /// [`PhotoCatalog::save`].
    pub fn commit_usage(&mut self, filename: &str) -> Result<u32> {
        let photo = self
            .photos
            .iter_mut()
            .find(|p| p.filename == filename)
            .ok_or_else(|| RotapostError::PhotoNotFound(filename.to_string()))?;
        photo.used_count = photo.used_count.saturating_add(1);
        Ok(photo.used_count)
    }

    pub fn path_for(photo: &Photo, base_path: &Path) -> PathBuf {
        base_path.join(&photo.filename)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

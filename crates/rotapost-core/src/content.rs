use crate::destination::DEFAULT_AUDIENCE;
use crate::error::{Result, RotapostError};
use crate::paths;
use crate::types::{ContentKind, Day};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Audience used for page posts.
pub const PAGE_AUDIENCE: &str = "page";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub category: String,
    /// Audience segment → text. `community` is the fallback variant.
    #[serde(default)]
    pub variations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_photos: Vec<String>,
    /// Calendar ordering hint; lower days are posted first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default)]
    pub content_type: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_day: Option<Day>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            variations: BTreeMap::new(),
            suggested_photos: Vec::new(),
            day: None,
            content_type: ContentKind::Ordinary,
            schedule_day: None,
        }
    }

    pub fn with_text(mut self, segment: impl Into<String>, text: impl Into<String>) -> Self {
        self.variations.insert(segment.into(), text.into());
        self
    }

    pub fn is_page(&self) -> bool {
        self.content_type == ContentKind::Page
    }

    /// Text for `segment`, falling back to the `community` variant. Surrounding
    /// whitespace is trimmed.
    pub fn text_for(&self, segment: &str) -> Result<&str> {
        self.variations
            .get(segment)
            .or_else(|| self.variations.get(DEFAULT_AUDIENCE))
            .map(|t| t.trim())
            .ok_or_else(|| RotapostError::MissingTextVariant {
                item: self.id.clone(),
                segment: segment.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The content calendar, in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<ContentItem>,
}

impl Catalog {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::content_path(root);
        if !path.exists() {
            return Err(RotapostError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let items: Vec<ContentItem> = serde_yaml::from_str(&data)?;
        Ok(Self::new(items))
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ContentItem> {
        self.items.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

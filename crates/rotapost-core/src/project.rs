use crate::content::Catalog;
use crate::destination::{Directory, DEFAULT_AUDIENCE};
use crate::error::Result;
use crate::paths;
use crate::photo::PhotoCatalog;
use crate::rules::RuleRecords;
use crate::schedule::{self, Schedule};
use crate::settings::{ConfigWarning, Settings};
use std::collections::HashSet;
use std::path::Path;

/// Every declarative input for one cycle, loaded from a project root.
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub settings: Settings,
    pub directory: Directory,
    pub catalog: Catalog,
    pub photos: PhotoCatalog,
    pub schedule: Schedule,
    pub rules: RuleRecords,
}

impl Project {
    pub fn load(root: &Path) -> Result<Self> {
        Ok(Self {
            settings: Settings::load(root)?,
            directory: Directory::load(root)?,
            catalog: Catalog::load(root)?,
            photos: PhotoCatalog::load(root)?,
            schedule: Schedule::load(root)?,
            rules: RuleRecords::load(root)?,
        })
    }

    /// Settings checks plus cross-file consistency.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = self.settings.validate();

        // 1. Ids must be well-formed and unique
        let mut seen = HashSet::new();
        for d in self.directory.all() {
            if let Err(e) = paths::validate_id(&d.id) {
                warnings.push(ConfigWarning::error(e.to_string()));
            }
            if !seen.insert(d.id.as_str()) {
                warnings.push(ConfigWarning::error(format!(
                    "duplicate destination id '{}'",
                    d.id
                )));
            }
        }
        let mut seen = HashSet::new();
        for item in self.catalog.items() {
            if let Err(e) = paths::validate_id(&item.id) {
                warnings.push(ConfigWarning::error(e.to_string()));
            }
            if !seen.insert(item.id.as_str()) {
                warnings.push(ConfigWarning::error(format!(
                    "duplicate content id '{}'",
                    item.id
                )));
            }
        }

        // 2. Schedule entries must name known destinations
        let mut unknown: Vec<&str> = self
            .schedule
            .mentioned_ids()
            .into_iter()
            .filter(|id| self.directory.get(id).is_none())
            .collect();
        unknown.sort_unstable();
        for id in unknown {
            warnings.push(ConfigWarning::warning(format!(
                "schedule lists unknown destination '{id}'"
            )));
        }

        // 3. Every active group should be reachable in the rotation
        for d in schedule::unscheduled(&self.schedule, &self.directory) {
            warnings.push(ConfigWarning::warning(format!(
                "active destination '{}' is never scheduled",
                d.id
            )));
        }

        // 4. Content must be deliverable somewhere, with a fallback text
        let accepted: HashSet<&str> = self
            .directory
            .all()
            .iter()
            .flat_map(|d| d.content_tags.iter().map(|t| t.as_str()))
            .collect();
        for item in self.catalog.items() {
            if !item.is_page() && !accepted.contains(item.category.as_str()) {
                warnings.push(ConfigWarning::warning(format!(
                    "content '{}' has category '{}' that no destination accepts",
                    item.id, item.category
                )));
            }
            if item.is_page() && item.schedule_day.is_none() {
                warnings.push(ConfigWarning::warning(format!(
                    "page content '{}' has no schedule_day and will never be posted",
                    item.id
                )));
            }
            if !item.is_page() && !item.variations.contains_key(DEFAULT_AUDIENCE) {
                warnings.push(ConfigWarning::warning(format!(
                    "content '{}' has no '{DEFAULT_AUDIENCE}' variant",
                    item.id
                )));
            }
            for f in &item.suggested_photos {
                if self.photos.get(f).is_none() {
                    warnings.push(ConfigWarning::warning(format!(
                        "content '{}' suggests photo '{f}' which is not in the manifest",
                        item.id
                    )));
                }
            }
        }

        warnings
    }
}

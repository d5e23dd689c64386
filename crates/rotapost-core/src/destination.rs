use crate::error::{Result, RotapostError};
use crate::paths;
use crate::types::{AllowedDays, Cadence, Day, DestinationKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

pub const DEFAULT_AUDIENCE: &str = "community";

// ---------------------------------------------------------------------------
// PostingRules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingRules {
    #[serde(default, rename = "promo_days")]
    pub allowed_days: AllowedDays,
    #[serde(default)]
    pub max_frequency: Cadence,
    #[serde(default = "default_promo_allowed")]
    pub promo_allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_only: Option<String>,
}

fn default_promo_allowed() -> bool {
    true
}

impl Default for PostingRules {
    fn default() -> Self {
        Self {
            allowed_days: AllowedDays::Any,
            max_frequency: Cadence::default(),
            promo_allowed: default_promo_allowed(),
            content_only: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Destination
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default = "default_tier")]
    pub tier: u8,
    #[serde(default = "default_audience")]
    pub audience_segment: String,
    #[serde(default)]
    pub content_tags: BTreeSet<String>,
    #[serde(default)]
    pub posting_rules: PostingRules,
    #[serde(default)]
    pub active: bool,
    #[serde(default, rename = "type")]
    pub kind: DestinationKind,
}

fn default_tier() -> u8 {
    3
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_string()
}

impl Destination {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            tier: default_tier(),
            audience_segment: default_audience(),
            content_tags: BTreeSet::new(),
            posting_rules: PostingRules::default(),
            active: true,
            kind: DestinationKind::Group,
        }
    }

    pub fn is_page(&self) -> bool {
        self.kind == DestinationKind::Page
    }

    pub fn allows_day(&self, day: Day) -> bool {
        self.posting_rules.allowed_days.allows(day)
    }

    pub fn cadence(&self) -> Cadence {
        self.posting_rules.max_frequency
    }

    pub fn promo_allowed(&self) -> bool {
        self.posting_rules.promo_allowed
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// All configured destinations, in file order, with an id index.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    destinations: Vec<Destination>,
    index: HashMap<String, usize>,
}

impl Directory {
    /// Later duplicates of an id are shadowed by the first occurrence.
    pub fn new(destinations: Vec<Destination>) -> Self {
        let mut index = HashMap::new();
        for (i, d) in destinations.iter().enumerate() {
            index.entry(d.id.clone()).or_insert(i);
        }
        Self {
            destinations,
            index,
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::destinations_path(root);
        if !path.exists() {
            return Err(RotapostError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let destinations: Vec<Destination> = serde_yaml::from_str(&data)?;
        Ok(Self::new(destinations))
    }

    pub fn get(&self, id: &str) -> Option<&Destination> {
        self.index.get(id).map(|&i| &self.destinations[i])
    }

    pub fn require(&self, id: &str) -> Result<&Destination> {
        self.get(id)
            .ok_or_else(|| RotapostError::DestinationNotFound(id.to_string()))
    }

    pub fn all(&self) -> &[Destination] {
        &self.destinations
    }

    /// Active ordinary destinations, optionally restricted to one tier.
    pub fn active_groups(&self, tier: Option<u8>) -> Vec<&Destination> {
        self.destinations
            .iter()
            .filter(|d| d.active && !d.is_page())
            .filter(|d| tier.map_or(true, |t| d.tier == t))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

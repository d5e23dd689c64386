use crate::error::Result;
use crate::paths;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// What is known about a destination's house rules. Written by the executor
/// or an operator; the engine only reads `rules_captured`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(default)]
    pub rules_captured: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rules: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleRecords(BTreeMap<String, RuleRecord>);

impl RuleRecords {
    pub fn new(records: BTreeMap<String, RuleRecord>) -> Self {
        Self(records)
    }

    /// Rules are optional; a missing file means nothing captured yet.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::rules_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let records: Option<BTreeMap<String, RuleRecord>> = serde_yaml::from_str(&data)?;
        Ok(Self(records.unwrap_or_default()))
    }

    pub fn get(&self, destination_id: &str) -> Option<&RuleRecord> {
        self.0.get(destination_id)
    }

    /// True until someone records that the destination's rules were captured.
    pub fn needs_capture(&self, destination_id: &str) -> bool {
        !self.get(destination_id).is_some_and(|r| r.rules_captured)
    }
}

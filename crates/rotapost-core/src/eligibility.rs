use crate::content::{Catalog, ContentItem};
use crate::destination::Destination;
use crate::history::HistoryStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// PromoCategories
// ---------------------------------------------------------------------------

/// Categories treated as promotional; withheld from destinations that do not
/// allow promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromoCategories(BTreeSet<String>);

impl Default for PromoCategories {
    fn default() -> Self {
        Self::new(["promo", "repairs", "smart_home", "data_recovery", "network"])
    }
}

impl PromoCategories {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(categories.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.contains(category)
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Content `destination` may legally receive, in catalog order.
///
/// An item must be ordinary (not page content), in one of the destination's
/// tags, not already used by the destination, match `content_only` when that
/// is set, and not be promotional where promotion is disallowed. An empty
/// result means nothing to post today.
pub fn eligible<'a>(
    destination: &Destination,
    catalog: &'a Catalog,
    history: &HistoryStore,
    promo: &PromoCategories,
) -> Vec<&'a ContentItem> {
    let used = history.used_content(&destination.id);
    let rules = &destination.posting_rules;

    catalog
        .items()
        .iter()
        .filter(|item| !item.is_page())
        .filter(|item| destination.content_tags.contains(&item.category))
        .filter(|item| !used.contains(item.id.as_str()))
        .filter(|item| {
            rules
                .content_only
                .as_deref()
                .map_or(true, |only| item.category == only)
        })
        .filter(|item| rules.promo_allowed || !promo.contains(&item.category))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use crate::content::ContentItem;

/// Sort key for items without a calendar hint; they go last.
pub const UNORDERED_DAY: u32 = 999;

/// Earliest item by calendar hint. Ties keep input order, so the same input
/// always yields the same pick.
pub fn pick<'a>(items: &[&'a ContentItem]) -> Option<&'a ContentItem> {
    items
        .iter()
        .copied()
        .enumerate()
        .min_by_key(|(i, item)| (item.day.unwrap_or(UNORDERED_DAY), *i))
        .map(|(_, item)| item)
}

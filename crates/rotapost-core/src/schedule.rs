use crate::content::{Catalog, ContentItem};
use crate::destination::{Destination, Directory};
use crate::error::{Result, RotapostError};
use crate::history::HistoryStore;
use crate::paths;
use crate::types::{Day, Period};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Weekdays the page slot runs on.
pub const PAGE_DAYS: [Day; 3] = [Day::Monday, Day::Wednesday, Day::Friday];

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Bi-weekly rotation: for each period, weekday → destination ids in posting
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub week_a: BTreeMap<Day, Vec<String>>,
    #[serde(default)]
    pub week_b: BTreeMap<Day, Vec<String>>,
}

impl Schedule {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::schedule_path(root);
        if !path.exists() {
            return Err(RotapostError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let schedule: Schedule = serde_yaml::from_str(&data)?;
        Ok(schedule)
    }

    pub fn period(&self, period: Period) -> &BTreeMap<Day, Vec<String>> {
        match period {
            Period::WeekA => &self.week_a,
            Period::WeekB => &self.week_b,
        }
    }

    /// Ids listed for `date`, in listed order.
    pub fn listed_for(&self, date: NaiveDate) -> &[String] {
        self.period(Period::for_date(date))
            .get(&Day::of(date))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every id mentioned anywhere in either period.
    pub fn mentioned_ids(&self) -> HashSet<&str> {
        self.week_a
            .values()
            .chain(self.week_b.values())
            .flatten()
            .map(|s| s.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// True when enough days have passed since the destination's last recorded
/// action for its cadence.
pub fn cadence_allows(destination: &Destination, history: &HistoryStore, now: NaiveDateTime) -> bool {
    history.days_since_last_action(&destination.id, now) >= destination.cadence().min_gap_days()
}

/// Ordinary destinations due at `now`, in schedule order, capped at
/// `max_per_day`.
///
/// Unknown, inactive and page ids are dropped silently. Day and cadence rules
/// are re-checked here so a hand-edited schedule cannot double-post.
pub fn due_destinations<'a>(
    now: NaiveDateTime,
    schedule: &Schedule,
    directory: &'a Directory,
    history: &HistoryStore,
    max_per_day: usize,
) -> Vec<&'a Destination> {
    let today = now.date();
    let day = Day::of(today);
    let mut seen = HashSet::new();

    schedule
        .listed_for(today)
        .iter()
        .filter_map(|id| directory.get(id))
        .filter(|d| d.active && !d.is_page())
        .filter(|d| seen.insert(d.id.as_str()))
        .filter(|d| {
            let allowed = d.allows_day(day);
            if !allowed {
                tracing::debug!(destination = %d.id, %day, "scheduled on a disallowed day, skipping");
            }
            allowed
        })
        .filter(|d| {
            let ok = cadence_allows(d, history, now);
            if !ok {
                tracing::debug!(destination = %d.id, "posted too recently, skipping");
            }
            ok
        })
        .take(max_per_day)
        .collect()
}

/// Active ordinary destinations that appear in neither period.
pub fn unscheduled<'a>(schedule: &Schedule, directory: &'a Directory) -> Vec<&'a Destination> {
    let mentioned = schedule.mentioned_ids();
    directory
        .active_groups(None)
        .into_iter()
        .filter(|d| !mentioned.contains(d.id.as_str()))
        .collect()
}

// ---------------------------------------------------------------------------
// Page slot
// ---------------------------------------------------------------------------

/// The page destination, on page days only.
pub fn page_for_today(today: NaiveDate, directory: &Directory) -> Option<&Destination> {
    if !PAGE_DAYS.contains(&Day::of(today)) {
        return None;
    }
    directory.all().iter().find(|d| d.is_page() && d.active)
}

/// Page content for today's weekday that the page has not used yet. Once the
/// weekday's bucket is exhausted the whole bucket becomes eligible again;
/// other weekdays' items are never borrowed.
pub fn page_content<'a>(
    today: NaiveDate,
    page: &Destination,
    catalog: &'a Catalog,
    history: &HistoryStore,
) -> Vec<&'a ContentItem> {
    let day = Day::of(today);
    let bucket: Vec<&ContentItem> = catalog
        .items()
        .iter()
        .filter(|c| c.is_page() && c.schedule_day == Some(day))
        .collect();

    let used = history.used_content(&page.id);
    let fresh: Vec<&ContentItem> = bucket
        .iter()
        .copied()
        .filter(|c| !used.contains(c.id.as_str()))
        .collect();

    if fresh.is_empty() && !bucket.is_empty() {
        tracing::info!(page = %page.id, %day, "page content exhausted for weekday, recycling");
        return bucket;
    }
    fresh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AllowedDays, Cadence, ContentKind, DestinationKind, Outcome};
    use chrono::Duration;

    // 2026-10-12 is a Monday in ISO week 42 (period A).
    fn monday_a() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 12)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn group(id: &str) -> Destination {
        Destination::new(id, id.to_uppercase(), format!("https://example.com/{id}"))
    }

    fn directory() -> Directory {
        let mut weekend = group("weekend");
        weekend.posting_rules.allowed_days = AllowedDays::Only(vec![Day::Saturday, Day::Sunday]);
        let mut daily = group("daily");
        daily.posting_rules.max_frequency = Cadence::Daily;
        let mut asleep = group("asleep");
        asleep.active = false;
        let mut page = group("page");
        page.kind = DestinationKind::Page;
        Directory::new(vec![
            group("g1"),
            group("g2"),
            group("g3"),
            weekend,
            daily,
            asleep,
            page,
        ])
    }

    fn schedule() -> Schedule {
        let yaml = r#"
week_a:
  monday: [g2, g1, ghost, asleep, page, weekend]
  saturday: [weekend, daily]
week_b:
  monday: [g3]
  tuesday: [daily]
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    fn empty_history() -> HistoryStore {
        HistoryStore::new("/nonexistent/history.json")
    }

    #[test]
    fn due_keeps_listed_order_and_drops_unknown() {
        let dir = directory();
        let due = due_destinations(monday_a(), &schedule(), &dir, &empty_history(), 10);
        let ids: Vec<&str> = due.iter().map(|d| d.id.as_str()).collect();
        // weekend is listed on Monday but only allowed on weekends.
        assert_eq!(ids, vec!["g2", "g1"]);
    }

    #[test]
    fn due_is_truncated_to_daily_limit() {
        let dir = directory();
        let due = due_destinations(monday_a(), &schedule(), &dir, &empty_history(), 1);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "g2");
    }

    #[test]
    fn due_uses_period_b_on_odd_weeks() {
        let dir = directory();
        let monday_b = monday_a() + Duration::days(7);
        let due = due_destinations(monday_b, &schedule(), &dir, &empty_history(), 10);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, "g3");
    }

    #[test]
    fn empty_day_yields_nothing() {
        let dir = directory();
        let thursday = monday_a() + Duration::days(3);
        assert!(due_destinations(thursday, &schedule(), &dir, &empty_history(), 10).is_empty());
    }

    #[test]
    fn recent_action_blocks_destination() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut history = HistoryStore::load(dir.path().join("history.json"));
        let now = monday_a();
        history
            .append("g2", "tips-1", Outcome::Success, now - Duration::days(3))
            .unwrap();
        let d = directory();
        let due = due_destinations(now, &schedule(), &d, &history, 10);
        let ids: Vec<&str> = due.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["g1"]);
    }

    #[test]
    fn day_restricted_destination_never_due_on_other_days() {
        let dir = directory();
        let sched = schedule();
        let history = empty_history();
        for offset in 0..28 {
            let now = monday_a() + Duration::days(offset);
            let day = Day::of(now.date());
            for d in due_destinations(now, &sched, &dir, &history, 10) {
                assert!(d.allows_day(day), "{} due on {day}", d.id);
            }
        }
    }

    #[test]
    fn biweekly_cycle_covers_every_scheduled_destination() {
        let dir = directory();
        let sched = schedule();
        let history = empty_history();
        let mut seen = HashSet::new();
        for offset in 0..14 {
            let now = monday_a() + Duration::days(offset);
            for d in due_destinations(now, &sched, &dir, &history, 10) {
                seen.insert(d.id.clone());
            }
        }
        for id in ["g1", "g2", "g3", "weekend", "daily"] {
            assert!(seen.contains(id), "{id} never due in a full cycle");
        }
        assert!(unscheduled(&sched, &dir).is_empty());
    }

    #[test]
    fn unscheduled_reports_missing_groups() {
        let dir = directory();
        let sched = Schedule::default();
        let ids: Vec<&str> = unscheduled(&sched, &dir).iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g2", "g3", "weekend", "daily"]);
    }

    fn page_item(id: &str, day: Day) -> ContentItem {
        let mut item = ContentItem::new(id, "repairs").with_text("page", id);
        item.content_type = ContentKind::Page;
        item.schedule_day = Some(day);
        item
    }

    #[test]
    fn page_only_on_page_days() {
        let dir = directory();
        let monday = monday_a().date();
        assert_eq!(page_for_today(monday, &dir).map(|d| d.id.as_str()), Some("page"));
        assert!(page_for_today(monday + Duration::days(1), &dir).is_none());
        assert!(page_for_today(monday + Duration::days(4), &dir).is_some());
    }

    #[test]
    fn page_content_resets_within_weekday_bucket() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut history = HistoryStore::load(tmp.path().join("history.json"));
        let dir = directory();
        let page = dir.get("page").unwrap();
        let catalog = Catalog::new(vec![
            page_item("mon-1", Day::Monday),
            page_item("mon-2", Day::Monday),
            page_item("wed-1", Day::Wednesday),
        ]);
        let monday = monday_a().date();

        let ids = |items: Vec<&ContentItem>| items.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(page_content(monday, page, &catalog, &history)), vec!["mon-1", "mon-2"]);

        history.append("page", "mon-1", Outcome::Success, monday_a()).unwrap();
        assert_eq!(ids(page_content(monday, page, &catalog, &history)), vec!["mon-2"]);

        history.append("page", "mon-2", Outcome::Success, monday_a()).unwrap();
        // Exhausted: Monday's bucket comes back, Wednesday's item is not borrowed.
        assert_eq!(ids(page_content(monday, page, &catalog, &history)), vec!["mon-1", "mon-2"]);

        let friday = monday + Duration::days(4);
        assert!(page_content(friday, page, &catalog, &history).is_empty());
    }
}

use crate::history::HistoryStore;
use crate::project::Project;
use crate::schedule;
use crate::types::Period;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Posting counts as of a given moment. Only successful posts are counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub date: NaiveDate,
    pub period: Period,
    pub posts_today: usize,
    pub posts_this_week: usize,
    pub posts_total: usize,
    pub failures_total: usize,
    pub destinations_total: usize,
    pub active_groups: usize,
    pub unscheduled_groups: usize,
    pub content_total: usize,
    pub photos_total: usize,
}

impl Stats {
    /// The week starts on Monday.
    pub fn compute(project: &Project, history: &HistoryStore, now: NaiveDateTime) -> Self {
        let today = now.date();
        let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));

        let mut stats = Stats {
            date: today,
            period: Period::for_date(today),
            posts_today: 0,
            posts_this_week: 0,
            posts_total: 0,
            failures_total: 0,
            destinations_total: project.directory.len(),
            active_groups: project.directory.active_groups(None).len(),
            unscheduled_groups: schedule::unscheduled(&project.schedule, &project.directory).len(),
            content_total: project.catalog.len(),
            photos_total: project.photos.photos().len(),
        };

        for (_, entries) in history.history().iter() {
            for entry in entries {
                if !entry.success {
                    stats.failures_total += 1;
                    continue;
                }
                stats.posts_total += 1;
                let day = entry.timestamp.date();
                if day == today {
                    stats.posts_today += 1;
                }
                if day >= week_start && day <= today {
                    stats.posts_this_week += 1;
                }
            }
        }
        stats
    }
}

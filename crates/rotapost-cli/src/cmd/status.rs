use crate::output::{print_json, print_table};
use anyhow::Context;
use rotapost_core::cycle::{Clock, SystemClock};
use rotapost_core::engine::SchedulingEngine;
use rotapost_core::history::{LoadSource, NEVER_POSTED_DAYS};
use rotapost_core::stats::Stats;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let engine = SchedulingEngine::open(root).context("failed to load project")?;
    let now = SystemClock.now();
    let stats = Stats::compute(engine.project(), engine.history(), now);
    let posting = &engine.project().settings.posting;
    let reason = engine
        .pause_marker()
        .reason()
        .context("failed to read pause marker")?;

    if json {
        return print_json(&serde_json::json!({
            "stats": stats,
            "paused": reason.is_some(),
            "pause_reason": reason,
            "posts_per_day": {
                "min": posting.min_posts_per_day,
                "max": posting.max_posts_per_day,
            },
        }));
    }

    match &reason {
        Some(r) => println!("PAUSED: {r}"),
        None => println!("Active"),
    }
    if engine.history().source() == LoadSource::Backup {
        println!("warning: history was restored from backup");
    }
    println!(
        "{} {}: {} posted today (target {}-{}), {} this week, {} total ({} failed attempts)",
        stats.date,
        stats.period,
        stats.posts_today,
        posting.min_posts_per_day,
        posting.max_posts_per_day,
        stats.posts_this_week,
        stats.posts_total,
        stats.failures_total
    );
    println!(
        "{} destinations ({} active groups, {} unscheduled), {} content items, {} photos\n",
        stats.destinations_total,
        stats.active_groups,
        stats.unscheduled_groups,
        stats.content_total,
        stats.photos_total
    );

    let history = engine.history();
    let rows = engine
        .project()
        .directory
        .active_groups(None)
        .into_iter()
        .map(|d| {
            let days = history.days_since_last_action(&d.id, now);
            vec![
                d.id.clone(),
                d.tier.to_string(),
                d.cadence().as_str().to_string(),
                if days == NEVER_POSTED_DAYS {
                    "never".to_string()
                } else {
                    format!("{days}d ago")
                },
                history.used_content(&d.id).len().to_string(),
            ]
        })
        .collect();
    print_table(&["DESTINATION", "TIER", "CADENCE", "LAST ATTEMPT", "USED"], rows);
    Ok(())
}

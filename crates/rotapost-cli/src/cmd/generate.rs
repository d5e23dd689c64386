use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use rotapost_core::cycle::{Clock, SystemClock};
use rotapost_core::engine::SchedulingEngine;
use rotapost_core::executor::ActionRequest;
use rotapost_core::types::Period;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Serialize)]
struct PlanEntry {
    destination_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    request: Option<ActionRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

#[derive(Serialize)]
struct Plan {
    date: NaiveDate,
    period: Period,
    entries: Vec<PlanEntry>,
}

fn entry(destination_id: &str, built: rotapost_core::Result<Option<ActionRequest>>) -> PlanEntry {
    let (request, note) = match built {
        Ok(Some(r)) => (Some(r), None),
        Ok(None) => (None, Some("no eligible content".to_string())),
        Err(e) => (None, Some(e.to_string())),
    };
    PlanEntry {
        destination_id: destination_id.to_string(),
        request,
        note,
    }
}

/// Build the requests a run would send, without executing or recording
/// anything.
pub fn run(root: &Path, date: Option<NaiveDate>, json: bool) -> anyhow::Result<()> {
    let engine = SchedulingEngine::open(root).context("failed to load project")?;
    let clock = SystemClock.now();
    let now = date.map_or(clock, |d| d.and_time(clock.time()));
    let today = now.date();

    let mut used = HashSet::new();
    let mut entries = Vec::new();
    for destination in engine.due_today(now) {
        let built = engine.build_action(destination, &used);
        if let Ok(Some(request)) = &built {
            used.insert(request.content_id.clone());
        }
        entries.push(entry(&destination.id, built));
    }
    if let Some(page) = engine.page_today(today) {
        entries.push(entry(&page.id, engine.build_page_action(page, today)));
    }

    let plan = Plan {
        date: today,
        period: Period::for_date(today),
        entries,
    };

    if json {
        return print_json(&plan);
    }

    println!("Plan for {} ({})", plan.date, plan.period);
    if plan.entries.is_empty() {
        println!("Nothing due.");
        return Ok(());
    }
    let rows = plan
        .entries
        .iter()
        .map(|e| match &e.request {
            Some(r) => vec![
                e.destination_id.clone(),
                r.content_id.clone(),
                r.audience_segment.clone(),
                r.photo_filename.clone().unwrap_or_else(|| "-".into()),
                if r.capture_rules { "yes" } else { "" }.to_string(),
            ],
            None => vec![
                e.destination_id.clone(),
                format!("({})", e.note.as_deref().unwrap_or("")),
                String::new(),
                String::new(),
                String::new(),
            ],
        })
        .collect();
    print_table(&["DESTINATION", "CONTENT", "AUDIENCE", "PHOTO", "RULES"], rows);
    Ok(())
}

use crate::cmd::pause::ensure_not_paused;
use crate::cmd::run::executor_for;
use crate::output::print_json;
use crate::ExecArgs;
use anyhow::Context;
use rotapost_core::cycle::{Clock, SystemClock};
use rotapost_core::engine::SchedulingEngine;
use rotapost_core::types::Outcome;
use std::collections::HashSet;
use std::path::Path;

/// Post to one destination now. Day and cadence rules are not checked;
/// content eligibility still is.
pub fn run(root: &Path, id: &str, exec: &ExecArgs, json: bool) -> anyhow::Result<()> {
    let mut engine = SchedulingEngine::open(root).context("failed to load project")?;
    ensure_not_paused(&engine.pause_marker())?;

    let destination = engine.project().directory.require(id)?.clone();
    if !destination.active {
        anyhow::bail!("destination '{id}' is inactive");
    }

    let now = SystemClock.now();
    let request = if destination.is_page() {
        engine.build_page_action(&destination, now.date())?
    } else {
        engine.build_action(&destination, &HashSet::new())?
    };
    let Some(request) = request else {
        if json {
            print_json(&serde_json::json!({ "destination_id": id, "request": null }))?;
        } else {
            println!("Nothing eligible for '{id}'.");
        }
        return Ok(());
    };

    let mut executor = executor_for(root, exec, &engine.project().settings)?;
    let result = executor.execute(&request);
    if !executor.is_dry_run() {
        engine
            .record_outcome(
                &request.destination_id,
                &request.content_id,
                request.photo_filename.as_deref(),
                Outcome::from_success(result.success),
                SystemClock.now(),
            )
            .context("failed to record outcome")?;
    }

    if json {
        print_json(&serde_json::json!({ "request": request, "result": result }))?;
    } else {
        println!("{} -> {}: {}", request.content_id, request.destination_id, result.message);
    }

    if !result.success {
        anyhow::bail!(
            "post to '{id}' failed: {}",
            result.error.as_deref().unwrap_or("no error given")
        );
    }
    Ok(())
}

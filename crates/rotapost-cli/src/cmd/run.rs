use crate::cmd::pause::ensure_not_paused;
use crate::output::{print_json, print_table};
use crate::pacer::RandomPacer;
use crate::ExecArgs;
use anyhow::Context;
use rotapost_core::cycle::{
    run_cycle, ActionStatus, CycleOptions, CycleReport, NoDelay, Pacer, SystemClock,
};
use rotapost_core::engine::SchedulingEngine;
use rotapost_core::executor::{ActionExecutor, CommandExecutor, DryRunExecutor};
use rotapost_core::settings::Settings;
use std::path::Path;

/// Dry-run when asked on the command line or in settings; otherwise the
/// configured program. Refuses to guess when neither is given.
pub fn executor_for(
    root: &Path,
    args: &ExecArgs,
    settings: &Settings,
) -> anyhow::Result<Box<dyn ActionExecutor>> {
    if args.dry_run || settings.safety.dry_run {
        return Ok(Box::new(DryRunExecutor::default()));
    }
    match &args.exec {
        Some(program) => Ok(Box::new(CommandExecutor::new(
            program,
            args.exec_args.clone(),
            root,
        ))),
        None => anyhow::bail!("no executor: pass --exec <PROGRAM> or --dry-run"),
    }
}

pub fn run(
    root: &Path,
    exec: &ExecArgs,
    page_only: bool,
    no_delay: bool,
    json: bool,
) -> anyhow::Result<()> {
    let mut engine = SchedulingEngine::open(root).context("failed to load project")?;
    ensure_not_paused(&engine.pause_marker())?;

    let settings = &engine.project().settings;
    let mut executor = executor_for(root, exec, settings)?;
    let mut pacer: Box<dyn Pacer> = if no_delay || executor.is_dry_run() {
        Box::new(NoDelay)
    } else {
        Box::new(RandomPacer::new(
            settings.posting.min_delay_minutes,
            settings.posting.max_delay_minutes,
        ))
    };

    let report = run_cycle(
        &mut engine,
        executor.as_mut(),
        pacer.as_mut(),
        &SystemClock,
        CycleOptions { page_only },
    )
    .context("cycle aborted")?;

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if report.tripped {
        anyhow::bail!(
            "{} posts failed; posting is paused until `rotapost resume`",
            report.failed()
        );
    }
    Ok(())
}

fn status_label(status: ActionStatus) -> &'static str {
    match status {
        ActionStatus::Posted => "posted",
        ActionStatus::Skipped => "skipped",
        ActionStatus::Failed => "FAILED",
    }
}

fn print_report(report: &CycleReport) {
    let mode = if report.dry_run { " (dry run)" } else { "" };
    println!("{} {}{mode}", report.date, report.period);
    if report.actions.is_empty() {
        println!("Nothing due today.");
        return;
    }
    let rows = report
        .actions
        .iter()
        .map(|a| {
            vec![
                a.destination_id.clone(),
                a.content_id.clone().unwrap_or_else(|| "-".into()),
                a.photo.clone().unwrap_or_else(|| "-".into()),
                status_label(a.status).to_string(),
                a.message.clone(),
            ]
        })
        .collect();
    print_table(&["DESTINATION", "CONTENT", "PHOTO", "STATUS", "MESSAGE"], rows);
    println!(
        "\nPosted {}, skipped {}, failed {}.",
        report.posted(),
        report.skipped(),
        report.failed()
    );
}

//! One daily run: the group pass over today's due destinations, then the
//! page slot.

use crate::breaker::CircuitBreaker;
use crate::destination::Destination;
use crate::engine::SchedulingEngine;
use crate::error::Result;
use crate::executor::{ActionExecutor, ActionRequest};
use crate::types::{Outcome, Period};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// Injected collaborators
// ---------------------------------------------------------------------------

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Called between consecutive executor calls.
pub trait Pacer {
    fn wait(&mut self);
}

pub struct NoDelay;

impl Pacer for NoDelay {
    fn wait(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOptions {
    /// Skip the group pass and only serve the page slot.
    pub page_only: bool,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Posted,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    pub destination_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub status: ActionStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub date: NaiveDate,
    pub period: Period,
    pub dry_run: bool,
    pub actions: Vec<ActionReport>,
    pub tripped: bool,
}

impl CycleReport {
    fn count(&self, status: ActionStatus) -> usize {
        self.actions.iter().filter(|a| a.status == status).count()
    }

    pub fn posted(&self) -> usize {
        self.count(ActionStatus::Posted)
    }

    pub fn skipped(&self) -> usize {
        self.count(ActionStatus::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(ActionStatus::Failed)
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

struct Run<'a> {
    engine: &'a mut SchedulingEngine,
    executor: &'a mut dyn ActionExecutor,
    pacer: &'a mut dyn Pacer,
    clock: &'a dyn Clock,
    breaker: CircuitBreaker,
    used: HashSet<String>,
    attempted: bool,
    report: CycleReport,
}

impl Run<'_> {
    fn skip(&mut self, destination: &Destination, message: String) {
        self.report.actions.push(ActionReport {
            destination_id: destination.id.clone(),
            content_id: None,
            photo: None,
            status: ActionStatus::Skipped,
            message,
        });
    }

    fn handle(&mut self, destination: &Destination, built: Result<Option<ActionRequest>>) -> Result<()> {
        let request = match built {
            Ok(Some(request)) => request,
            Ok(None) => {
                self.skip(destination, "no eligible content".into());
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(destination = %destination.id, error = %e, "cannot build post");
                self.skip(destination, e.to_string());
                return Ok(());
            }
        };

        if self.attempted {
            self.pacer.wait();
        }
        self.attempted = true;

        let result = self.executor.execute(&request);
        let outcome = Outcome::from_success(result.success);
        if !self.executor.is_dry_run() {
            self.engine.record_outcome(
                &request.destination_id,
                &request.content_id,
                request.photo_filename.as_deref(),
                outcome,
                self.clock.now(),
            )?;
        }
        if outcome.is_success() {
            self.used.insert(request.content_id.clone());
            tracing::info!(destination = %request.destination_id, content = %request.content_id, "posted");
        } else {
            tracing::warn!(
                destination = %request.destination_id,
                error = result.error.as_deref().unwrap_or("unknown"),
                "post failed"
            );
        }

        let message = match (&result.error, outcome) {
            (Some(err), Outcome::Failure) if !result.message.is_empty() => {
                format!("{}: {err}", result.message)
            }
            (Some(err), Outcome::Failure) => err.clone(),
            _ => result.message.clone(),
        };
        self.report.actions.push(ActionReport {
            destination_id: request.destination_id,
            content_id: Some(request.content_id),
            photo: request.photo_filename,
            status: if outcome.is_success() {
                ActionStatus::Posted
            } else {
                ActionStatus::Failed
            },
            message,
        });

        if self.breaker.record(outcome) {
            let reason = format!(
                "paused at {}: {} failed posts in one run",
                self.clock.now().format("%Y-%m-%d %H:%M"),
                self.breaker.failures()
            );
            tracing::error!(failures = self.breaker.failures(), "circuit breaker tripped, pausing");
            self.engine.pause_marker().pause(&reason)?;
            self.report.tripped = true;
        }
        Ok(())
    }
}

/// Run today's cycle. Stops early, and writes the pause marker, once the
/// circuit breaker trips. Outcomes from a dry-run executor are not recorded.
pub fn run_cycle(
    engine: &mut SchedulingEngine,
    executor: &mut dyn ActionExecutor,
    pacer: &mut dyn Pacer,
    clock: &dyn Clock,
    options: CycleOptions,
) -> Result<CycleReport> {
    let start = clock.now();
    let today = start.date();
    let due: Vec<Destination> = if options.page_only {
        Vec::new()
    } else {
        engine.due_today(start).into_iter().cloned().collect()
    };
    let page = engine.page_today(today).cloned();
    let breaker = CircuitBreaker::new(engine.project().settings.safety.max_failures);
    let dry_run = executor.is_dry_run();

    tracing::info!(%today, due = due.len(), page = page.is_some(), dry_run, "starting cycle");

    let mut run = Run {
        engine,
        executor,
        pacer,
        clock,
        breaker,
        used: HashSet::new(),
        attempted: false,
        report: CycleReport {
            date: today,
            period: Period::for_date(today),
            dry_run,
            actions: Vec::new(),
            tripped: false,
        },
    };

    for destination in &due {
        let built = run.engine.build_action(destination, &run.used);
        run.handle(destination, built)?;
        if run.report.tripped {
            return Ok(run.report);
        }
    }

    if let Some(page) = page {
        let built = run.engine.build_page_action(&page, today);
        run.handle(&page, built)?;
    }

    Ok(run.report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

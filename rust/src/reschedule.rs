//! Daily auto-reschedule gate.
//!
//! `RescheduleTracker` remembers the last calendar day a full reschedule pass
//! completed. The first `ensure_daily_reschedule` call of a day runs the full
//! pipeline and persists changed dates; later calls that day are no-ops.
//! The tracker is an explicit value owned by the caller, not a global.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SchedulingConfig;
use crate::engine::{schedule, ScheduleError};
use crate::models::{DependencyEdge, ScheduleNode, ScheduleRequest, ScheduleWarning};
use crate::{log_changes, log_checks};

/// Error type for storage collaborators.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Snapshot of a project's work items and dependencies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGraph {
    pub nodes: Vec<ScheduleNode>,
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,
}

/// Storage seam used by the auto-reschedule pass.
pub trait ScheduleStore {
    /// Load every current work item and dependency.
    fn load_graph(&self) -> Result<ProjectGraph, StoreError>;

    /// Persist new scheduled dates for one work item.
    fn write_scheduled_dates(
        &self,
        work_item_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), StoreError>;
}

/// Errors from an auto-reschedule pass. The tracker is not advanced on any of them.
#[derive(Error, Debug)]
pub enum RescheduleError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("Failed to load project graph: {0}")]
    Load(#[source] StoreError),
    #[error("Failed to persist dates for work item {work_item_id}: {source}")]
    Write {
        work_item_id: String,
        #[source]
        source: StoreError,
    },
}

/// What `ensure_daily_reschedule` did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RescheduleOutcome {
    /// A pass already completed today; nothing was loaded or written.
    AlreadyRan,
    /// A full pass ran and the tracker advanced to today.
    Rescheduled {
        items_written: usize,
        warnings: Vec<ScheduleWarning>,
    },
}

/// Process-wide "once per day" gate around the full reschedule pipeline.
#[derive(Debug, Default)]
pub struct RescheduleTracker {
    last_run_date: Mutex<Option<NaiveDate>>,
    config: SchedulingConfig,
}

impl RescheduleTracker {
    pub fn new(config: SchedulingConfig) -> Self {
        Self {
            last_run_date: Mutex::new(None),
            config,
        }
    }

    // A panic mid-pass leaves the date unadvanced, so the guarded value is
    // still valid after poisoning.
    fn state(&self) -> MutexGuard<'_, Option<NaiveDate>> {
        self.last_run_date
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Day of the last completed pass, if any.
    pub fn last_run_date(&self) -> Option<NaiveDate> {
        *self.state()
    }

    /// Forget the last run so the next check runs unconditionally.
    pub fn reset(&self) {
        *self.state() = None;
        log_checks!(self.config.verbosity, "reschedule tracker reset");
    }

    /// Run one full reschedule pass per calendar day.
    ///
    /// The lock is held for the whole check-run-write-advance sequence, so
    /// concurrent callers on the same day produce exactly one pass.
    ///
    /// # Errors
    /// Load, scheduling and write failures are returned as-is and leave the
    /// last run date unchanged, so the next call retries.
    pub fn ensure_daily_reschedule<S: ScheduleStore + ?Sized>(
        &self,
        store: &S,
        today: NaiveDate,
    ) -> Result<RescheduleOutcome, RescheduleError> {
        let verbosity = self.config.verbosity;
        let mut last_run = self.state();

        if *last_run == Some(today) {
            log_checks!(verbosity, %today, "reschedule already ran today");
            return Ok(RescheduleOutcome::AlreadyRan);
        }

        let graph = store.load_graph().map_err(RescheduleError::Load)?;
        let request = ScheduleRequest::full(graph.nodes, graph.edges, today);
        let response = schedule(&request, &self.config)?;

        let mut items_written = 0;
        for item in response.scheduled_items.iter().filter(|item| item.dates_changed()) {
            store
                .write_scheduled_dates(
                    &item.work_item_id,
                    item.scheduled_start_date,
                    item.scheduled_end_date,
                )
                .map_err(|source| RescheduleError::Write {
                    work_item_id: item.work_item_id.clone(),
                    source,
                })?;
            items_written += 1;
        }

        *last_run = Some(today);
        log_changes!(
            verbosity,
            %today,
            items_written,
            warnings = response.warnings.len(),
            "daily reschedule completed"
        );

        Ok(RescheduleOutcome::Rescheduled {
            items_written,
            warnings: response.warnings,
        })
    }
}

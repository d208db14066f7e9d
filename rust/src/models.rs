//! Core data types for the scheduling engine.
//!
//! Field and variant names follow the external JSON contract: `camelCase`
//! fields, `snake_case` enum values, `YYYY-MM-DD` dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a work item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Blocked,
}

/// Which pair of dates a dependency edge constrains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// Successor starts after predecessor finishes.
    #[default]
    FinishToStart,
    /// Successor starts after predecessor starts.
    StartToStart,
    /// Successor finishes after predecessor finishes.
    FinishToFinish,
    /// Successor finishes after predecessor starts.
    StartToFinish,
}

/// One work item participating in scheduling.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleNode {
    pub id: String,
    #[serde(default)]
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub status: WorkItemStatus,
    #[serde(default)]
    pub actual_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_end_date: Option<NaiveDate>,
    /// Earliest allowed start.
    #[serde(default)]
    pub start_after: Option<NaiveDate>,
    /// Latest desired start. Violations only warn.
    #[serde(default)]
    pub start_before: Option<NaiveDate>,
    /// Currently persisted scheduled start, echoed back as `previousStartDate`.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Currently persisted scheduled end, echoed back as `previousEndDate`.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl ScheduleNode {
    pub fn new(id: impl Into<String>, duration_days: Option<u32>, status: WorkItemStatus) -> Self {
        Self {
            id: id.into(),
            duration_days,
            status,
            ..Self::default()
        }
    }

    /// True when both actual start and end dates are recorded, whatever the status.
    pub fn has_actual_dates(&self) -> bool {
        self.actual_start_date.is_some() && self.actual_end_date.is_some()
    }
}

/// Directed dependency `predecessor_id -> successor_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    pub predecessor_id: String,
    pub successor_id: String,
    #[serde(default)]
    pub dependency_type: DependencyType,
    /// Negative = lead (overlap), positive = lag (delay).
    #[serde(default)]
    pub lead_lag_days: i32,
}

impl DependencyEdge {
    pub fn new(
        predecessor_id: impl Into<String>,
        successor_id: impl Into<String>,
        dependency_type: DependencyType,
        lead_lag_days: i32,
    ) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            successor_id: successor_id.into(),
            dependency_type,
            lead_lag_days,
        }
    }

    /// Finish-to-start edge with no lag.
    pub fn finish_to_start(predecessor_id: impl Into<String>, successor_id: impl Into<String>) -> Self {
        Self::new(predecessor_id, successor_id, DependencyType::FinishToStart, 0)
    }
}

/// Recompute everything, or only what an anchor item can affect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleMode {
    #[default]
    Full,
    Cascade,
}

/// Input to one scheduling run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub nodes: Vec<ScheduleNode>,
    #[serde(default)]
    pub edges: Vec<DependencyEdge>,
    pub today: NaiveDate,
    #[serde(default)]
    pub mode: ScheduleMode,
    #[serde(default)]
    pub anchor_work_item_id: Option<String>,
    /// Start date for items without predecessors. Defaults to `today`.
    #[serde(default)]
    pub project_start: Option<NaiveDate>,
}

impl ScheduleRequest {
    /// Full-project request.
    pub fn full(nodes: Vec<ScheduleNode>, edges: Vec<DependencyEdge>, today: NaiveDate) -> Self {
        Self {
            nodes,
            edges,
            today,
            mode: ScheduleMode::Full,
            anchor_work_item_id: None,
            project_start: None,
        }
    }

    /// Cascade request anchored at `anchor`.
    pub fn cascade(
        nodes: Vec<ScheduleNode>,
        edges: Vec<DependencyEdge>,
        today: NaiveDate,
        anchor: impl Into<String>,
    ) -> Self {
        Self {
            mode: ScheduleMode::Cascade,
            anchor_work_item_id: Some(anchor.into()),
            ..Self::full(nodes, edges, today)
        }
    }

    pub fn with_project_start(mut self, project_start: NaiveDate) -> Self {
        self.project_start = Some(project_start);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Day used as ES for items without predecessors.
    pub fn effective_project_start(&self) -> NaiveDate {
        self.project_start.unwrap_or(self.today)
    }
}

/// Scheduling result for one work item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledItem {
    pub work_item_id: String,
    pub previous_start_date: Option<NaiveDate>,
    pub previous_end_date: Option<NaiveDate>,
    pub scheduled_start_date: NaiveDate,
    pub scheduled_end_date: NaiveDate,
    pub latest_start_date: NaiveDate,
    pub latest_finish_date: NaiveDate,
    /// LS - ES in days.
    pub total_float: i64,
    pub is_critical: bool,
    /// A today-floor clamp moved this item.
    pub is_late: bool,
}

impl ScheduledItem {
    /// Whether the resolved dates differ from the persisted ones.
    pub fn dates_changed(&self) -> bool {
        self.previous_start_date != Some(self.scheduled_start_date)
            || self.previous_end_date != Some(self.scheduled_end_date)
    }
}

/// Kind of non-fatal scheduling warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    StartBeforeViolated,
    NoDuration,
    AlreadyCompleted,
}

/// Non-fatal issue found while scheduling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWarning {
    pub work_item_id: String,
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
}

impl ScheduleWarning {
    pub fn new(work_item_id: impl Into<String>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            work_item_id: work_item_id.into(),
            kind,
            message: message.into(),
        }
    }
}

//! Critical-path scheduling engine for project work items.
//!
//! Given work items, typed and lagged dependencies between them, and today's
//! date, the engine computes earliest/latest dates, float and the critical
//! path, then reconciles the result with real-world progress (today-floors,
//! recorded actual dates). A `RescheduleTracker` wraps the same pipeline in a
//! once-per-day gate that persists changed dates through a `ScheduleStore`.

mod clamp;
mod config;
mod cpm;
pub mod days;
mod engine;
mod graph;
mod interner;
pub mod logging;
mod models;
pub mod reschedule;
mod response;
pub mod validation;

#[cfg(feature = "python")]
mod python;

pub use clamp::{resolve, ClampRule, ResolvedDates};
pub use config::SchedulingConfig;
pub use cpm::{solve, CpmResult, Timing};
pub use engine::{schedule, ScheduleError};
pub use graph::{GraphError, Link, ScheduleGraph};
pub use interner::{NodeIdx, WorkItemIndex};
pub use models::{
    DependencyEdge, DependencyType, ScheduleMode, ScheduleNode, ScheduleRequest, ScheduleWarning,
    ScheduledItem, WarningKind, WorkItemStatus,
};
pub use reschedule::{
    ProjectGraph, RescheduleError, RescheduleOutcome, RescheduleTracker, ScheduleStore, StoreError,
};
pub use response::{assemble, ScheduleResponse};
pub use validation::{topological_order, CycleError};

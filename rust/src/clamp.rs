//! Calendar clamp and override resolution.
//!
//! Applied per node on top of raw CPM dates, in priority order:
//! 1. Completed items with both actual dates use them verbatim.
//! 2. Not-started items whose ES is before today move to today, keeping duration.
//! 3. In-progress items whose EF is before today finish today.
//!
//! Otherwise the raw dates pass through. Rules 2 and 3 only ever move dates later.

use crate::days::{to_day, Day};
use crate::models::{ScheduleNode, WorkItemStatus};

/// Which rule produced a node's displayed dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClampRule {
    ActualDates,
    NotStartedFloor,
    InProgressFloor,
    Raw,
}

/// Displayed start/end after resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedDates {
    pub start: Day,
    pub end: Day,
    pub is_late: bool,
    pub rule: ClampRule,
}

/// Recorded start/end of a completed item, when both are present.
pub fn actual_dates(node: &ScheduleNode) -> Option<(Day, Day)> {
    if node.status != WorkItemStatus::Completed {
        return None;
    }
    match (node.actual_start_date, node.actual_end_date) {
        (Some(start), Some(end)) => Some((to_day(start), to_day(end))),
        _ => None,
    }
}

/// Resolve the displayed dates for one node from its raw ES/EF.
pub fn resolve(node: &ScheduleNode, es: Day, ef: Day, today: Day) -> ResolvedDates {
    if let Some((start, end)) = actual_dates(node) {
        return ResolvedDates {
            start,
            end,
            is_late: false,
            rule: ClampRule::ActualDates,
        };
    }

    match node.status {
        WorkItemStatus::NotStarted if es < today => {
            let shift = today - es;
            ResolvedDates {
                start: today,
                end: ef + shift,
                is_late: true,
                rule: ClampRule::NotStartedFloor,
            }
        }
        WorkItemStatus::InProgress if ef < today => ResolvedDates {
            start: es,
            end: today,
            is_late: true,
            rule: ClampRule::InProgressFloor,
        },
        _ => ResolvedDates {
            start: es,
            end: ef,
            is_late: false,
            rule: ClampRule::Raw,
        },
    }
}

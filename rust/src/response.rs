//! Schedule response assembly.

use serde::{Deserialize, Serialize};

use crate::cpm::CpmResult;
use crate::days::{to_date, Day};
use crate::engine::ScheduleError;
use crate::graph::ScheduleGraph;
use crate::models::{ScheduleWarning, ScheduledItem};

/// External response shape for one scheduling run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    /// One item per scheduled work item, in input order.
    pub scheduled_items: Vec<ScheduledItem>,
    /// Zero-float work items in topological order.
    pub critical_path: Vec<String>,
    pub warnings: Vec<ScheduleWarning>,
}

impl ScheduleResponse {
    pub fn item(&self, work_item_id: &str) -> Option<&ScheduledItem> {
        self.scheduled_items
            .iter()
            .find(|item| item.work_item_id == work_item_id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Map solver and resolver output onto the response shape.
pub fn assemble(
    graph: &ScheduleGraph<'_>,
    cpm: &CpmResult,
    warnings: Vec<ScheduleWarning>,
) -> Result<ScheduleResponse, ScheduleError> {
    let mut scheduled_items = Vec::with_capacity(graph.len());

    for (i, node) in graph.nodes.iter().enumerate() {
        let (Some(timing), Some(dates)) = (cpm.timings[i], cpm.resolved[i]) else {
            continue;
        };
        let date = |day: Day| to_date(day).ok_or_else(|| ScheduleError::DateOutOfRange(node.id.clone()));

        scheduled_items.push(ScheduledItem {
            work_item_id: node.id.clone(),
            previous_start_date: node.start_date,
            previous_end_date: node.end_date,
            scheduled_start_date: date(dates.start)?,
            scheduled_end_date: date(dates.end)?,
            latest_start_date: date(timing.ls)?,
            latest_finish_date: date(timing.lf)?,
            total_float: timing.total_float(),
            is_critical: timing.is_critical(),
            is_late: dates.is_late,
        });
    }

    let critical_path = cpm
        .critical_path
        .iter()
        .map(|&idx| graph.id(idx).to_string())
        .collect();

    Ok(ScheduleResponse {
        scheduled_items,
        critical_path,
        warnings,
    })
}

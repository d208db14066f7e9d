//! Cycle detection and constraint checks.
//!
//! Cycles are fatal: a topological order is required before any pass runs.
//! Everything else found here is reported as a `ScheduleWarning`.

use std::collections::VecDeque;

use crate::clamp::{ClampRule, ResolvedDates};
use crate::days::to_day;
use crate::graph::ScheduleGraph;
use crate::interner::NodeIdx;
use crate::models::{ScheduleWarning, WarningKind, WorkItemStatus};

/// A dependency cycle, as work-item ids with the first id repeated at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    pub cycle: Vec<String>,
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Circular dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl std::error::Error for CycleError {}

/// Order all nodes so every predecessor precedes its successors (Kahn's algorithm).
///
/// The queue is seeded in input order, so the result is deterministic for a
/// given input.
pub fn topological_order(graph: &ScheduleGraph<'_>) -> Result<Vec<NodeIdx>, CycleError> {
    let n = graph.len();
    let mut in_degree: Vec<usize> = graph.predecessors.iter().map(Vec::len).collect();

    let mut queue: VecDeque<NodeIdx> = (0..n as NodeIdx)
        .filter(|&idx| in_degree[idx as usize] == 0)
        .collect();
    let mut order = Vec::with_capacity(n);

    while let Some(idx) = queue.pop_front() {
        order.push(idx);
        for link in &graph.successors[idx as usize] {
            let degree = &mut in_degree[link.node as usize];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(link.node);
            }
        }
    }

    if order.len() != n {
        return Err(CycleError {
            cycle: extract_cycle(graph, &in_degree),
        });
    }

    Ok(order)
}

/// Recover one concrete cycle from the nodes Kahn's algorithm could not order.
///
/// Every leftover node still has a leftover predecessor, so walking
/// predecessors from any leftover node must revisit a node.
fn extract_cycle(graph: &ScheduleGraph<'_>, in_degree: &[usize]) -> Vec<String> {
    let Some(start) = (0..graph.len()).find(|&idx| in_degree[idx] > 0) else {
        return Vec::new();
    };

    let mut position: Vec<Option<usize>> = vec![None; graph.len()];
    let mut walk: Vec<NodeIdx> = Vec::new();
    let mut current = start as NodeIdx;

    loop {
        if let Some(pos) = position[current as usize] {
            // Walk went successor -> predecessor; flip it to edge direction
            // and start from the revisited node
            let mut cycle: Vec<String> = walk[pos..]
                .iter()
                .rev()
                .map(|&idx| graph.id(idx).to_string())
                .collect();
            cycle.rotate_right(1);
            if let Some(first) = cycle.first().cloned() {
                cycle.push(first);
            }
            return cycle;
        }
        position[current as usize] = Some(walk.len());
        walk.push(current);

        match graph.predecessors[current as usize]
            .iter()
            .find(|link| in_degree[link.node as usize] > 0)
        {
            Some(link) => current = link.node,
            None => return walk.iter().map(|&idx| graph.id(idx).to_string()).collect(),
        }
    }
}

/// Collect non-fatal warnings for the in-scope nodes, in topological order.
pub fn constraint_warnings(
    graph: &ScheduleGraph<'_>,
    order: &[NodeIdx],
    in_scope: &[bool],
    resolved: &[Option<ResolvedDates>],
) -> Vec<ScheduleWarning> {
    let mut warnings = Vec::new();

    for &idx in order {
        let i = idx as usize;
        if !in_scope[i] {
            continue;
        }
        let node = graph.node(idx);

        if graph.missing_duration[i] {
            warnings.push(ScheduleWarning::new(
                &node.id,
                WarningKind::NoDuration,
                format!(
                    "Work item has no duration; scheduled with a default of {} day(s)",
                    graph.durations[i]
                ),
            ));
        }

        if node.status == WorkItemStatus::Completed && !node.has_actual_dates() {
            warnings.push(ScheduleWarning::new(
                &node.id,
                WarningKind::AlreadyCompleted,
                "Work item is completed but has no recorded actual dates; dates were re-projected",
            ));
        }

        let (Some(start_before), Some(dates)) = (node.start_before, resolved[i]) else {
            continue;
        };
        if dates.rule == ClampRule::ActualDates {
            continue;
        }
        let overrun = dates.start - to_day(start_before);
        if overrun > 0 {
            let message = match node.start_after {
                Some(start_after) if start_after > start_before => format!(
                    "Start-after {} conflicts with start-before {}; scheduled start is {} day(s) late",
                    start_after, start_before, overrun
                ),
                _ => format!(
                    "Scheduled start is {} day(s) after start-before {}",
                    overrun, start_before
                ),
            };
            warnings.push(ScheduleWarning::new(
                &node.id,
                WarningKind::StartBeforeViolated,
                message,
            ));
        }
    }

    warnings
}

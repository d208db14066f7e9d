//! Critical path calculation using forward and backward passes.
//!
//! Both passes run over a scope of nodes (all nodes, or the part of the graph
//! downstream of a cascade anchor). Predecessors outside the scope are frozen
//! at their persisted dates.
//!
//! Each node is resolved against today as soon as its forward step is done,
//! and successors are anchored on those resolved dates. Completed items with
//! recorded actual dates are pinned to them. Float is taken from the
//! unclamped ES/LS pair.

use crate::clamp::{self, ClampRule, ResolvedDates};
use crate::days::{to_day, Day};
use crate::graph::{Link, ScheduleGraph};
use crate::interner::NodeIdx;
use crate::models::DependencyType;
use crate::{log_changes, log_debug};

/// Per-node CPM dates, as day numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Earliest start (forward pass).
    pub es: Day,
    /// Earliest finish = ES + duration (actual span for pinned items).
    pub ef: Day,
    /// Latest start (backward pass).
    pub ls: Day,
    /// Latest finish (backward pass).
    pub lf: Day,
}

impl Timing {
    pub fn total_float(&self) -> Day {
        self.ls - self.es
    }

    pub fn is_critical(&self) -> bool {
        self.total_float() == 0
    }

    fn span(&self) -> Day {
        self.ef - self.es
    }
}

/// Result of a CPM run over a scope.
#[derive(Clone, Debug, Default)]
pub struct CpmResult {
    /// Timing per node, `None` for nodes outside the scope.
    pub timings: Vec<Option<Timing>>,
    /// Dates after today-floors and actual dates, `None` outside the scope.
    pub resolved: Vec<Option<ResolvedDates>>,
    /// Zero-float nodes in topological order.
    pub critical_path: Vec<NodeIdx>,
    /// Latest EF among the scope's terminal nodes.
    pub project_end: Day,
}

/// Lower bound a predecessor places on its successor's ES.
///
/// `anchor` is the predecessor's start for SS/SF edges and its finish for FS/FF.
fn forward_bound(kind: DependencyType, anchor: Day, lag: Day, duration: Day) -> Day {
    match kind {
        DependencyType::FinishToStart | DependencyType::StartToStart => anchor + lag,
        // Constrains EF; back-derive ES
        DependencyType::FinishToFinish | DependencyType::StartToFinish => anchor + lag - duration,
    }
}

/// Upper bound a successor places on its predecessor's LF.
fn backward_bound(kind: DependencyType, succ: &Timing, lag: Day, duration: Day) -> Day {
    match kind {
        DependencyType::FinishToStart => succ.ls - lag,
        DependencyType::StartToStart => succ.ls - lag + duration,
        DependencyType::FinishToFinish => succ.lf - lag,
        DependencyType::StartToFinish => succ.lf - lag + duration,
    }
}

/// Start/finish of a predecessor as seen by its successors.
fn predecessor_dates(
    graph: &ScheduleGraph<'_>,
    resolved: &[Option<ResolvedDates>],
    link: &Link,
) -> (Option<Day>, Option<Day>) {
    match resolved[link.node as usize] {
        Some(dates) => (Some(dates.start), Some(dates.end)),
        None => {
            let node = graph.node(link.node);
            (node.start_date.map(to_day), node.end_date.map(to_day))
        }
    }
}

/// Successors that still constrain `idx` in the backward pass. Pinned
/// (completed) work is history and sets no deadline for its predecessors.
fn live_successors<'g>(
    graph: &'g ScheduleGraph<'_>,
    resolved: &'g [Option<ResolvedDates>],
    idx: usize,
) -> impl Iterator<Item = &'g Link> + 'g {
    graph.successors[idx].iter().filter(move |link| {
        resolved[link.node as usize].is_some_and(|dates| dates.rule != ClampRule::ActualDates)
    })
}

/// Run the forward and backward passes and resolve every in-scope node.
///
/// `order` must be a topological order of the whole graph; `in_scope` must be
/// closed under successors.
pub fn solve(
    graph: &ScheduleGraph<'_>,
    order: &[NodeIdx],
    in_scope: &[bool],
    project_start: Day,
    today: Day,
    verbosity: u8,
) -> CpmResult {
    let n = graph.len();
    let mut timings: Vec<Option<Timing>> = vec![None; n];
    let mut resolved: Vec<Option<ResolvedDates>> = vec![None; n];

    // Forward pass: ES = max over incoming constraints, or project start
    for &idx in order {
        let i = idx as usize;
        if !in_scope[i] {
            continue;
        }
        let node = graph.node(idx);
        let duration = graph.durations[i];

        let (es, ef) = match clamp::actual_dates(node) {
            Some(pinned) => pinned,
            None => {
                let mut earliest: Option<Day> = None;
                for link in &graph.predecessors[i] {
                    let (pred_start, pred_finish) = predecessor_dates(graph, &resolved, link);
                    let needed = match link.kind {
                        DependencyType::FinishToStart | DependencyType::FinishToFinish => pred_finish,
                        DependencyType::StartToStart | DependencyType::StartToFinish => pred_start,
                    };
                    let Some(anchor) = needed else {
                        log_debug!(
                            verbosity,
                            work_item = %node.id,
                            predecessor = graph.id(link.node),
                            "predecessor has no persisted dates, constraint skipped"
                        );
                        continue;
                    };
                    let bound = forward_bound(link.kind, anchor, link.lag, duration);
                    earliest = Some(earliest.map_or(bound, |e| e.max(bound)));
                }

                let mut es = earliest.unwrap_or(project_start);
                if let Some(start_after) = node.start_after {
                    es = es.max(to_day(start_after));
                }
                (es, es + duration)
            }
        };

        let dates = clamp::resolve(node, es, ef, today);
        log_debug!(verbosity, work_item = %node.id, es, ef, "forward pass");
        if dates.is_late {
            log_changes!(
                verbosity,
                work_item = %node.id,
                rule = ?dates.rule,
                start = dates.start,
                end = dates.end,
                raw_start = es,
                raw_end = ef,
                "dates floored to today"
            );
        }
        timings[i] = Some(Timing { es, ef, ls: es, lf: ef });
        resolved[i] = Some(dates);
    }

    let project_end = order
        .iter()
        .filter(|&&idx| {
            in_scope[idx as usize] && live_successors(graph, &resolved, idx as usize).next().is_none()
        })
        .filter_map(|&idx| timings[idx as usize].map(|t| t.ef))
        .max()
        .unwrap_or(project_start);

    // Backward pass: LF = min over outgoing constraints, or project end
    for &idx in order.iter().rev() {
        let i = idx as usize;
        let Some(span) = timings[i].map(|t| t.span()) else {
            continue;
        };

        let latest_finish = live_successors(graph, &resolved, i)
            .filter_map(|link| {
                timings[link.node as usize].map(|succ| backward_bound(link.kind, &succ, link.lag, span))
            })
            .min()
            .unwrap_or(project_end);

        if let Some(timing) = timings[i].as_mut() {
            timing.lf = latest_finish;
            timing.ls = latest_finish - span;
            log_debug!(
                verbosity,
                work_item = graph.id(idx),
                ls = timing.ls,
                lf = timing.lf,
                float = timing.total_float(),
                "backward pass"
            );
        }
    }

    let critical_path = order
        .iter()
        .copied()
        .filter(|&idx| timings[idx as usize].is_some_and(|t| t.is_critical()))
        .collect();

    CpmResult {
        timings,
        resolved,
        critical_path,
        project_end,
    }
}

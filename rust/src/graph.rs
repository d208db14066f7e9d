//! Index-based dependency graph.
//!
//! Work items live in an arena addressed by `NodeIdx`; every edge is stored
//! twice, once on the successor's predecessor list and once on the
//! predecessor's successor list.

use thiserror::Error;

use crate::config::SchedulingConfig;
use crate::days::Day;
use crate::interner::{NodeIdx, WorkItemIndex};
use crate::models::{DependencyEdge, DependencyType, ScheduleNode};

/// Input problems found while building the graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate work item id: {0}")]
    DuplicateWorkItem(String),
    #[error("Dependency {predecessor} -> {successor} references unknown work item {missing}")]
    UnknownWorkItem {
        predecessor: String,
        successor: String,
        missing: String,
    },
    #[error("Work item {0} has an actual end date before its actual start date")]
    InvalidActualDates(String),
}

/// One side of a dependency edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    /// The node at the other end of the edge.
    pub node: NodeIdx,
    pub kind: DependencyType,
    pub lag: Day,
}

/// Arena of work items with adjacency lists.
#[derive(Debug)]
pub struct ScheduleGraph<'a> {
    pub index: WorkItemIndex,
    pub nodes: &'a [ScheduleNode],
    /// Effective duration per node (fallback applied).
    pub durations: Vec<Day>,
    /// Nodes whose duration came from the fallback.
    pub missing_duration: Vec<bool>,
    pub predecessors: Vec<Vec<Link>>,
    pub successors: Vec<Vec<Link>>,
}

impl<'a> ScheduleGraph<'a> {
    /// Build the graph, rejecting duplicate ids, dangling edges and
    /// inverted actual dates.
    pub fn build(
        nodes: &'a [ScheduleNode],
        edges: &[DependencyEdge],
        config: &SchedulingConfig,
    ) -> Result<Self, GraphError> {
        let n = nodes.len();
        let mut index = WorkItemIndex::with_capacity(n);
        let mut durations = Vec::with_capacity(n);
        let mut missing_duration = Vec::with_capacity(n);

        for node in nodes {
            if index.insert(&node.id).is_none() {
                return Err(GraphError::DuplicateWorkItem(node.id.clone()));
            }
            if let (Some(start), Some(end)) = (node.actual_start_date, node.actual_end_date) {
                if end < start {
                    return Err(GraphError::InvalidActualDates(node.id.clone()));
                }
            }
            let duration = node.duration_days.unwrap_or(config.default_duration_days);
            durations.push(Day::from(duration));
            missing_duration.push(node.duration_days.is_none());
        }

        let mut predecessors: Vec<Vec<Link>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<Link>> = vec![Vec::new(); n];

        for edge in edges {
            let lookup = |id: &str| {
                index.get(id).ok_or_else(|| GraphError::UnknownWorkItem {
                    predecessor: edge.predecessor_id.clone(),
                    successor: edge.successor_id.clone(),
                    missing: id.to_string(),
                })
            };
            let pred = lookup(&edge.predecessor_id)?;
            let succ = lookup(&edge.successor_id)?;
            let lag = Day::from(edge.lead_lag_days);

            predecessors[succ as usize].push(Link {
                node: pred,
                kind: edge.dependency_type,
                lag,
            });
            successors[pred as usize].push(Link {
                node: succ,
                kind: edge.dependency_type,
                lag,
            });
        }

        Ok(Self {
            index,
            nodes,
            durations,
            missing_duration,
            predecessors,
            successors,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, idx: NodeIdx) -> &'a ScheduleNode {
        &self.nodes[idx as usize]
    }

    #[inline]
    pub fn id(&self, idx: NodeIdx) -> &str {
        self.index.id(idx)
    }

    /// Nodes reachable from `start` along successor edges, `start` included.
    /// Returned as a membership vector indexed by `NodeIdx`.
    pub fn downstream_of(&self, start: NodeIdx) -> Vec<bool> {
        let mut seen = vec![false; self.len()];
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            if seen[idx as usize] {
                continue;
            }
            seen[idx as usize] = true;
            for link in &self.successors[idx as usize] {
                if !seen[link.node as usize] {
                    stack.push(link.node);
                }
            }
        }
        seen
    }
}

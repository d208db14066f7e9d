//! Scheduling pipeline: validate, solve, clamp, assemble.

use thiserror::Error;

use crate::config::SchedulingConfig;
use crate::cpm;
use crate::days::to_day;
use crate::graph::{GraphError, ScheduleGraph};
use crate::models::{ScheduleMode, ScheduleRequest};
use crate::response::{self, ScheduleResponse};
use crate::validation::{self, CycleError};
use crate::{log_changes, log_checks};

/// Errors that abort a scheduling run. No partial schedule is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },
    #[error("Cascade mode requires an anchor work item")]
    MissingAnchor,
    #[error("Anchor work item not found: {0}")]
    AnchorNotFound(String),
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
    #[error("Scheduled dates for work item {0} fall outside the supported calendar")]
    DateOutOfRange(String),
}

impl From<GraphError> for ScheduleError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::DuplicateWorkItem(id) => ScheduleError::DuplicateWorkItem(id),
            GraphError::UnknownWorkItem {
                predecessor,
                successor,
                missing,
            } => ScheduleError::UnknownWorkItem {
                predecessor,
                successor,
                missing,
            },
            GraphError::InvalidActualDates(id) => ScheduleError::InvalidActualDates(id),
        }
    }
}

impl From<CycleError> for ScheduleError {
    fn from(err: CycleError) -> Self {
        ScheduleError::CircularDependency { cycle: err.cycle }
    }
}

/// Schedule a project graph.
///
/// Pure with respect to its inputs: `request.today` stands in for the clock
/// and nothing is persisted.
///
/// # Errors
/// * `CircularDependency` if any cycle exists anywhere in the graph
/// * `MissingAnchor` / `AnchorNotFound` for a malformed cascade request
/// * graph construction errors for malformed nodes or edges
pub fn schedule(
    request: &ScheduleRequest,
    config: &SchedulingConfig,
) -> Result<ScheduleResponse, ScheduleError> {
    let verbosity = config.verbosity;
    log_changes!(
        verbosity,
        mode = ?request.mode,
        nodes = request.nodes.len(),
        edges = request.edges.len(),
        "scheduling run started"
    );

    let graph = ScheduleGraph::build(&request.nodes, &request.edges, config)?;

    let order = validation::topological_order(&graph).inspect_err(|err| {
        log_checks!(verbosity, cycle = %err, "schedule rejected");
    })?;

    let in_scope = match request.mode {
        ScheduleMode::Full => vec![true; graph.len()],
        ScheduleMode::Cascade => {
            let anchor = request
                .anchor_work_item_id
                .as_deref()
                .ok_or(ScheduleError::MissingAnchor)?;
            let anchor_idx = graph
                .index
                .get(anchor)
                .ok_or_else(|| ScheduleError::AnchorNotFound(anchor.to_string()))?;
            graph.downstream_of(anchor_idx)
        }
    };

    let today = to_day(request.today);
    let project_start = to_day(request.effective_project_start());
    let result = cpm::solve(&graph, &order, &in_scope, project_start, today, verbosity);

    let warnings = validation::constraint_warnings(&graph, &order, &in_scope, &result.resolved);
    let response = response::assemble(&graph, &result, warnings)?;

    log_changes!(
        verbosity,
        items = response.scheduled_items.len(),
        critical = response.critical_path.len(),
        warnings = response.warnings.len(),
        "scheduling run finished"
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DependencyEdge, DependencyType, ScheduleNode, WarningKind, WorkItemStatus,
    };
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn day(offset: i64) -> NaiveDate {
        today() + Duration::days(offset)
    }

    fn make_node(id: &str, duration: u32) -> ScheduleNode {
        ScheduleNode::new(id, Some(duration), WorkItemStatus::NotStarted)
    }

    fn run(request: &ScheduleRequest) -> ScheduleResponse {
        schedule(request, &SchedulingConfig::default()).unwrap()
    }

    #[test]
    fn test_simple_chain_scenario() {
        let nodes = vec![make_node("a", 2), make_node("b", 3), make_node("c", 1)];
        let edges = vec![
            DependencyEdge::finish_to_start("a", "b"),
            DependencyEdge::finish_to_start("b", "c"),
        ];

        let response = run(&ScheduleRequest::full(nodes, edges, today()));

        let expect = [("a", 0, 2), ("b", 2, 5), ("c", 5, 6)];
        for (id, es, ef) in expect {
            let item = response.item(id).unwrap();
            assert_eq!(item.scheduled_start_date, day(es), "{id} start");
            assert_eq!(item.scheduled_end_date, day(ef), "{id} end");
            assert_eq!(item.total_float, 0);
            assert!(item.is_critical);
            assert!(!item.is_late);
        }
        assert_eq!(response.critical_path, vec!["a", "b", "c"]);
        assert!(response.warnings.is_empty());
    }

    #[test]
    fn test_float_scenario() {
        // a -> c directly and a -> b -> c; d runs alongside b with slack
        let nodes = vec![
            make_node("a", 2),
            make_node("b", 1),
            make_node("c", 1),
            make_node("d", 0),
        ];
        let edges = vec![
            DependencyEdge::finish_to_start("a", "c"),
            DependencyEdge::finish_to_start("a", "b"),
            DependencyEdge::finish_to_start("b", "c"),
            DependencyEdge::finish_to_start("a", "d"),
            DependencyEdge::finish_to_start("d", "c"),
        ];

        let response = run(&ScheduleRequest::full(nodes, edges, today()));

        // c waits for the longer chain through b
        assert_eq!(response.item("c").unwrap().scheduled_start_date, day(3));
        assert_eq!(response.critical_path, vec!["a", "b", "c"]);

        let parallel = response.item("d").unwrap();
        assert!(parallel.total_float > 0);
        assert!(!parallel.is_critical);
    }

    #[test]
    fn test_stale_not_started_scenario() {
        let nodes = vec![make_node("a", 3)];
        let request = ScheduleRequest::full(nodes, vec![], today()).with_project_start(day(-1));

        let response = run(&request);
        let item = response.item("a").unwrap();

        assert_eq!(item.scheduled_start_date, today());
        assert_eq!(item.scheduled_end_date, day(3)); // raw EF day(2) shifted by one
        assert!(item.is_late);
        // LS/LF stay raw
        assert_eq!(item.latest_start_date, day(-1));
        assert_eq!(item.latest_finish_date, day(2));
    }

    #[test]
    fn test_cycle_scenario() {
        let nodes = vec![make_node("a", 1), make_node("b", 1), make_node("c", 1)];
        let edges = vec![
            DependencyEdge::finish_to_start("a", "b"),
            DependencyEdge::finish_to_start("b", "a"),
        ];

        let err = schedule(
            &ScheduleRequest::full(nodes, edges, today()),
            &SchedulingConfig::default(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ScheduleError::CircularDependency {
                cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()]
            }
        );
        assert_eq!(err.to_string(), "Circular dependency detected: a -> b -> a");
    }

    #[test]
    fn test_completed_item_actual_dates_win() {
        let mut done = ScheduleNode::new("done", Some(5), WorkItemStatus::Completed);
        done.actual_start_date = Some(day(-20));
        done.actual_end_date = Some(day(-12));
        let nodes = vec![done, make_node("next", 2)];
        let edges = vec![DependencyEdge::finish_to_start("done", "next")];
        let request = ScheduleRequest::full(nodes, edges, today());

        let first = run(&request);
        let second = run(&request);

        let item = first.item("done").unwrap();
        assert_eq!(item.scheduled_start_date, day(-20));
        assert_eq!(item.scheduled_end_date, day(-12));
        assert!(!item.is_late);
        assert_eq!(first, second);
        // no already_completed warning when actual dates exist
        assert!(first.warnings.is_empty());
    }

    #[test]
    fn test_in_progress_overrun_finishes_today() {
        let mut running = ScheduleNode::new("running", Some(4), WorkItemStatus::InProgress);
        running.start_after = Some(day(-10));
        let request =
            ScheduleRequest::full(vec![running], vec![], today()).with_project_start(day(-10));

        let response = run(&request);
        let item = response.item("running").unwrap();

        assert_eq!(item.scheduled_start_date, day(-10));
        assert_eq!(item.scheduled_end_date, today());
        assert!(item.is_late);
    }

    #[test]
    fn test_missing_duration_uses_single_default() {
        let nodes = vec![
            ScheduleNode::new("a", None, WorkItemStatus::NotStarted),
            make_node("b", 2),
        ];
        let edges = vec![DependencyEdge::finish_to_start("a", "b")];
        let config = SchedulingConfig {
            default_duration_days: 4,
            ..Default::default()
        };

        let response = schedule(&ScheduleRequest::full(nodes, edges, today()), &config).unwrap();

        let a = response.item("a").unwrap();
        assert_eq!(a.scheduled_end_date, day(4));
        assert_eq!(a.latest_finish_date, day(4));
        assert_eq!(response.item("b").unwrap().scheduled_start_date, day(4));
        assert_eq!(response.warnings.len(), 1);
        assert_eq!(response.warnings[0].kind, WarningKind::NoDuration);
        assert!(response.warnings[0].message.contains("4 day(s)"));
    }

    #[test]
    fn test_start_before_violation_is_warning_only() {
        let mut tight = make_node("tight", 1);
        tight.start_before = Some(day(1));
        let nodes = vec![make_node("first", 5), tight];
        let edges = vec![DependencyEdge::finish_to_start("first", "tight")];

        let response = run(&ScheduleRequest::full(nodes, edges, today()));

        assert_eq!(response.scheduled_items.len(), 2);
        assert_eq!(response.item("tight").unwrap().scheduled_start_date, day(5));
        assert_eq!(response.warnings.len(), 1);
        assert_eq!(response.warnings[0].work_item_id, "tight");
        assert_eq!(response.warnings[0].kind, WarningKind::StartBeforeViolated);
    }

    #[test]
    fn test_completed_without_actuals_warns() {
        let nodes = vec![ScheduleNode::new("done", Some(1), WorkItemStatus::Completed)];
        let response = run(&ScheduleRequest::full(nodes, vec![], today()));

        assert_eq!(response.warnings.len(), 1);
        assert_eq!(response.warnings[0].kind, WarningKind::AlreadyCompleted);
    }

    #[test]
    fn test_negative_lead_can_trigger_clamp() {
        // b may start two days before a starts, which is before today
        let nodes = vec![make_node("a", 3), make_node("b", 1)];
        let edges = vec![DependencyEdge::new(
            "a",
            "b",
            DependencyType::StartToStart,
            -2,
        )];

        let response = run(&ScheduleRequest::full(nodes, edges, today()));

        let b = response.item("b").unwrap();
        assert_eq!(b.scheduled_start_date, today());
        assert_eq!(b.scheduled_end_date, day(1));
        assert!(b.is_late);
    }

    #[test]
    fn test_floored_item_pushes_its_successors() {
        // r(5) SS-3 -> a(4) FS-1 -> b(1); a would start three days ago
        let nodes = vec![make_node("r", 5), make_node("a", 4), make_node("b", 1)];
        let edges = vec![
            DependencyEdge::new("r", "a", DependencyType::StartToStart, -3),
            DependencyEdge::new("a", "b", DependencyType::FinishToStart, -1),
        ];

        let response = run(&ScheduleRequest::full(nodes, edges, today()));

        let a = response.item("a").unwrap();
        let b = response.item("b").unwrap();
        assert_eq!((a.scheduled_start_date, a.scheduled_end_date), (today(), day(4)));
        assert!(a.is_late);
        assert_eq!((b.scheduled_start_date, b.scheduled_end_date), (day(3), day(4)));
        assert!(b.scheduled_start_date >= a.scheduled_end_date - Duration::days(1));
    }

    #[test]
    fn test_finished_work_releases_successor_today() {
        let mut done = ScheduleNode::new("done", Some(10), WorkItemStatus::Completed);
        done.actual_start_date = NaiveDate::from_ymd_opt(2025, 2, 1);
        done.actual_end_date = NaiveDate::from_ymd_opt(2025, 2, 5);
        let nodes = vec![done, make_node("next", 2)];
        let edges = vec![DependencyEdge::finish_to_start("done", "next")];

        let response = run(&ScheduleRequest::full(nodes, edges, today()));

        let next = response.item("next").unwrap();
        assert_eq!(next.scheduled_start_date, today());
        assert_eq!(next.scheduled_end_date, day(2));
        assert!(next.is_late);
        let done = response.item("done").unwrap();
        assert_eq!(done.total_float, 0);
        assert!(response.scheduled_items.iter().all(|item| item.total_float >= 0));
    }

    #[test]
    fn test_every_node_scheduled_with_consistent_criticality() {
        let nodes: Vec<ScheduleNode> = (0..8).map(|i| make_node(&format!("n{i}"), i % 4)).collect();
        let edges = vec![
            DependencyEdge::finish_to_start("n0", "n2"),
            DependencyEdge::new("n1", "n2", DependencyType::StartToStart, 1),
            DependencyEdge::new("n2", "n3", DependencyType::FinishToFinish, 2),
            DependencyEdge::new("n2", "n4", DependencyType::StartToFinish, 3),
            DependencyEdge::finish_to_start("n3", "n5"),
            DependencyEdge::new("n4", "n5", DependencyType::FinishToStart, -1),
            DependencyEdge::finish_to_start("n6", "n7"),
        ];

        let response = run(&ScheduleRequest::full(nodes, edges, today()));

        assert_eq!(response.scheduled_items.len(), 8);
        for item in &response.scheduled_items {
            assert!(item.total_float >= 0, "{} has negative float", item.work_item_id);
            assert_eq!(item.is_critical, item.total_float == 0);
            assert_eq!(
                response.critical_path.contains(&item.work_item_id),
                item.is_critical
            );
        }
    }

    #[test]
    fn test_cascade_limits_output_to_downstream() {
        // up -> anchor -> down; side is unrelated
        let mut up = make_node("up", 2);
        up.start_date = Some(day(0));
        up.end_date = Some(day(6)); // persisted later than a fresh computation would give
        let nodes = vec![up, make_node("anchor", 1), make_node("down", 2), make_node("side", 1)];
        let edges = vec![
            DependencyEdge::finish_to_start("up", "anchor"),
            DependencyEdge::finish_to_start("anchor", "down"),
        ];

        let response = run(&ScheduleRequest::cascade(nodes, edges, today(), "anchor"));

        let ids: Vec<&str> = response
            .scheduled_items
            .iter()
            .map(|i| i.work_item_id.as_str())
            .collect();
        assert_eq!(ids, vec!["anchor", "down"]);
        assert_eq!(response.item("anchor").unwrap().scheduled_start_date, day(6));
        assert_eq!(response.item("down").unwrap().scheduled_start_date, day(7));
        assert_eq!(response.critical_path, vec!["anchor", "down"]);
    }

    #[test]
    fn test_cascade_requires_anchor() {
        let nodes = vec![make_node("a", 1)];
        let mut request = ScheduleRequest::full(nodes, vec![], today());
        request.mode = ScheduleMode::Cascade;

        let err = schedule(&request, &SchedulingConfig::default()).unwrap_err();
        assert_eq!(err, ScheduleError::MissingAnchor);

        request.anchor_work_item_id = Some("ghost".to_string());
        let err = schedule(&request, &SchedulingConfig::default()).unwrap_err();
        assert_eq!(err, ScheduleError::AnchorNotFound("ghost".to_string()));
    }

    #[test]
    fn test_cascade_still_rejects_unrelated_cycle() {
        let nodes = vec![make_node("anchor", 1), make_node("x", 1), make_node("y", 1)];
        let edges = vec![
            DependencyEdge::finish_to_start("x", "y"),
            DependencyEdge::finish_to_start("y", "x"),
        ];

        let err = schedule(
            &ScheduleRequest::cascade(nodes, edges, today(), "anchor"),
            &SchedulingConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ScheduleError::CircularDependency { .. }));
    }

    #[test]
    fn test_previous_dates_echoed() {
        let mut node = make_node("a", 1);
        node.start_date = Some(day(-3));
        node.end_date = Some(day(-2));

        let response = run(&ScheduleRequest::full(vec![node], vec![], today()));
        let item = response.item("a").unwrap();

        assert_eq!(item.previous_start_date, Some(day(-3)));
        assert_eq!(item.previous_end_date, Some(day(-2)));
        assert!(item.dates_changed());
    }

    #[test]
    fn test_json_round_trip_through_pipeline() {
        let json = r#"{
            "nodes": [
                {"id": "design", "durationDays": 2, "status": "completed",
                 "actualStartDate": "2025-03-01", "actualEndDate": "2025-03-04"},
                {"id": "build", "durationDays": 3},
                {"id": "ship"}
            ],
            "edges": [
                {"predecessorId": "design", "successorId": "build"},
                {"predecessorId": "build", "successorId": "ship",
                 "dependencyType": "finish_to_start", "leadLagDays": 1}
            ],
            "today": "2025-03-10"
        }"#;
        let request = ScheduleRequest::from_json(json).unwrap();

        let response = run(&request);
        let value: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();

        assert_eq!(value["scheduledItems"][0]["scheduledStartDate"], "2025-03-01");
        assert_eq!(value["scheduledItems"][0]["scheduledEndDate"], "2025-03-04");
        // build waited on design's actual finish, so it is floored to today
        assert_eq!(value["scheduledItems"][1]["scheduledStartDate"], "2025-03-10");
        assert_eq!(value["scheduledItems"][1]["isLate"], true);
        assert_eq!(value["scheduledItems"][2]["scheduledStartDate"], "2025-03-14");
        assert_eq!(value["warnings"][0]["workItemId"], "ship");
        assert_eq!(value["warnings"][0]["type"], "no_duration");
    }
}

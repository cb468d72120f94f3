use cvmatch_core::{ActionError, ActionKind, RemoteError, TaskResult, TaskState, TaskTracker};
use serde_json::json;

const ALL_KINDS: [ActionKind; 8] = [
    ActionKind::ParseJson,
    ActionKind::ParseExcel,
    ActionKind::CreateJob,
    ActionKind::ListJobs,
    ActionKind::GetJob,
    ActionKind::Match,
    ActionKind::BatchMatch,
    ActionKind::ExportMatches,
];

#[test]
fn idle_tracker_allows_every_kind() {
    let tracker = TaskTracker::new();
    assert!(ALL_KINDS.iter().all(|&kind| tracker.can_start(kind)));
}

#[test]
fn running_blocks_every_kind_until_acknowledged() {
    let mut tracker = TaskTracker::new();
    tracker.begin(ActionKind::Match).unwrap();

    assert!(ALL_KINDS.iter().all(|&kind| !tracker.can_start(kind)));
    let err = tracker.begin(ActionKind::ListJobs).unwrap_err();
    assert!(matches!(err, ActionError::ConflictingAction { .. }));
    assert_eq!(
        tracker.state(),
        &TaskState::Running {
            kind: ActionKind::Match
        }
    );

    // Running cannot be acknowledged away.
    assert!(!tracker.acknowledge());

    let result = Ok(TaskResult::Json(json!([])));
    assert!(tracker.finish(ActionKind::Match, &result));
    assert!(!tracker.can_start(ActionKind::Match));

    assert!(tracker.acknowledge());
    assert!(tracker.can_start(ActionKind::Match));
}

#[test]
fn finish_for_other_kind_is_ignored() {
    let mut tracker = TaskTracker::new();
    tracker.begin(ActionKind::ParseJson).unwrap();

    assert!(!tracker.finish(ActionKind::Match, &Ok(TaskResult::Json(json!(null)))));
    assert!(matches!(tracker.state(), TaskState::Running { .. }));
}

#[test]
fn failure_surfaces_service_detail() {
    let mut tracker = TaskTracker::new();
    tracker.begin(ActionKind::Match).unwrap();

    let outcome = Err(ActionError::Remote(RemoteError::status(
        500,
        Some("job not found".to_string()),
    )));
    tracker.finish(ActionKind::Match, &outcome);

    assert_eq!(
        tracker.state(),
        &TaskState::Failed {
            kind: ActionKind::Match,
            message: "job not found".to_string(),
        }
    );
}

#[test]
fn failure_without_detail_uses_kind_fallback() {
    let mut tracker = TaskTracker::new();
    tracker.begin(ActionKind::ExportMatches).unwrap();

    let outcome = Err(ActionError::Remote(RemoteError::network("connection refused")));
    tracker.finish(ActionKind::ExportMatches, &outcome);

    assert_eq!(
        tracker.state(),
        &TaskState::Failed {
            kind: ActionKind::ExportMatches,
            message: "An error occurred while exporting the results.".to_string(),
        }
    );
}

#[test]
fn malformed_response_reads_as_generic_failure() {
    let err = ActionError::MalformedResponse {
        kind: ActionKind::ListJobs,
    };
    assert_eq!(
        err.user_message(ActionKind::ListJobs),
        "Could not load job descriptions."
    );
}

#[test]
fn parse_failures_name_their_own_step() {
    let network = ActionError::Remote(RemoteError::network("connection reset"));
    assert_eq!(
        network.user_message(ActionKind::ParseJson),
        "An error occurred while uploading the CVs."
    );
    assert_eq!(
        network.user_message(ActionKind::ParseExcel),
        "An error occurred while generating the Excel file."
    );
}

#[test]
fn interrupt_fails_only_the_running_kind() {
    let mut tracker = TaskTracker::new();
    assert!(!tracker.interrupt(ActionKind::Match));

    tracker.begin(ActionKind::Match).unwrap();
    assert!(!tracker.interrupt(ActionKind::ListJobs));
    assert!(tracker.interrupt(ActionKind::Match));
    assert_eq!(
        tracker.state(),
        &TaskState::Failed {
            kind: ActionKind::Match,
            message: "match was interrupted.".to_string(),
        }
    );

    // Already terminal: a late finish is ignored.
    assert!(!tracker.finish(ActionKind::Match, &Ok(TaskResult::Json(serde_json::json!([])))));
    assert!(tracker.acknowledge());
    assert!(tracker.state().is_idle());
}

#[test]
fn acknowledge_on_idle_is_noop() {
    let mut tracker = TaskTracker::new();
    assert!(!tracker.acknowledge());
    assert!(tracker.state().is_idle());
}

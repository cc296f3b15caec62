//! Event handler behaviour against in-memory collaborators.

mod common;

use std::sync::Arc;

use common::{bridge, repo, ChecksCall, FakeChecks, FakeTransport};
use gitbridge_core::{
    CheckConclusion, CheckRunId, CheckRunStatus, CheckSuiteAction, CommitSha, CoreError,
    PipelineStatus, PrimaryEvent, SecondaryEvent,
};
use gitbridge_daemon::{DaemonError, IgnoreReason, Outcome};
use gitbridge_sync::SyncError;

fn sha(raw: &str) -> CommitSha {
    CommitSha::parse(raw).unwrap()
}

fn check_suite(raw_sha: &str) -> PrimaryEvent {
    PrimaryEvent::CheckSuite {
        action: CheckSuiteAction::Requested,
        head_sha: sha(raw_sha),
    }
}

fn pipeline(raw_sha: &str, status: &str) -> SecondaryEvent {
    SecondaryEvent::Pipeline {
        sha: sha(raw_sha),
        status: PipelineStatus::from(status),
    }
}

// ---------------------------------------------------------------------------
// 1. Check-suite → pipeline round trip
// ---------------------------------------------------------------------------

#[test]
fn requested_check_suite_then_successful_pipeline_completes_the_run() {
    let checks = Arc::new(FakeChecks::new());
    let bridge = bridge(Some(Arc::clone(&checks)), &FakeTransport::default());

    let created = bridge.handle_primary(check_suite("abc123")).unwrap();
    assert_eq!(
        created,
        Outcome::CheckRunCreated {
            sha: sha("abc123"),
            check_run: CheckRunId(42)
        }
    );

    let completed = bridge.handle_secondary(pipeline("abc123", "success")).unwrap();
    assert_eq!(
        completed,
        Outcome::CheckRunCompleted {
            sha: sha("abc123"),
            check_run: CheckRunId(42),
            conclusion: CheckConclusion::Success,
        }
    );

    let calls = checks.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        ChecksCall::Create(slug, request) => {
            assert_eq!(slug, &repo());
            assert_eq!(request.head_sha, sha("abc123"));
            assert_eq!(request.status, CheckRunStatus::InProgress);
            assert_eq!(request.name, "gitbridge");
        }
        other => panic!("expected create, got {other:?}"),
    }
    match &calls[1] {
        ChecksCall::Update(_, id, request) => {
            assert_eq!(*id, CheckRunId(42));
            assert_eq!(request.status, CheckRunStatus::Completed);
            assert_eq!(request.conclusion, CheckConclusion::Success);
        }
        other => panic!("expected update, got {other:?}"),
    }
}

#[test]
fn every_terminal_status_reaches_the_check_run() {
    for (status, expected) in [
        ("success", CheckConclusion::Success),
        ("canceled", CheckConclusion::Cancelled),
        ("failed", CheckConclusion::Failure),
        ("skipped", CheckConclusion::Cancelled),
    ] {
        let checks = Arc::new(FakeChecks::new());
        let bridge = bridge(Some(Arc::clone(&checks)), &FakeTransport::default());
        bridge.handle_primary(check_suite("beef01")).unwrap();

        let outcome = bridge.handle_secondary(pipeline("beef01", status)).unwrap();
        assert!(
            matches!(outcome, Outcome::CheckRunCompleted { conclusion, .. } if conclusion == expected),
            "{status}: got {outcome:?}"
        );
    }
}

#[test]
fn uncorrelated_pipeline_makes_no_api_calls() {
    let checks = Arc::new(FakeChecks::new());
    let bridge = bridge(Some(Arc::clone(&checks)), &FakeTransport::default());

    let outcome = bridge.handle_secondary(pipeline("d00d", "success")).unwrap();

    assert_eq!(
        outcome,
        Outcome::Ignored(IgnoreReason::NoCorrelation(sha("d00d")))
    );
    assert!(checks.calls().is_empty());
}

#[test]
fn pending_and_running_pipelines_are_ignored() {
    let checks = Arc::new(FakeChecks::new());
    let bridge = bridge(Some(Arc::clone(&checks)), &FakeTransport::default());
    bridge.handle_primary(check_suite("abc123")).unwrap();

    for status in ["pending", "running"] {
        let outcome = bridge.handle_secondary(pipeline("abc123", status)).unwrap();
        assert!(
            matches!(outcome, Outcome::Ignored(IgnoreReason::PipelineNotTerminal(_))),
            "{status}: got {outcome:?}"
        );
    }
    assert_eq!(checks.calls().len(), 1, "only the create call");
}

#[test]
fn unsupported_status_is_an_error_and_updates_nothing() {
    let checks = Arc::new(FakeChecks::new());
    let bridge = bridge(Some(Arc::clone(&checks)), &FakeTransport::default());
    bridge.handle_primary(check_suite("abc123")).unwrap();

    let err = bridge
        .handle_secondary(pipeline("abc123", "manual"))
        .unwrap_err();

    assert!(
        matches!(err, DaemonError::Core(CoreError::UnsupportedStatus(ref s)) if s == "manual"),
        "got: {err}"
    );
    assert_eq!(checks.calls().len(), 1);
}

#[test]
fn failed_creation_records_nothing() {
    let checks = Arc::new(FakeChecks::failing_create());
    let bridge = bridge(Some(Arc::clone(&checks)), &FakeTransport::default());

    let err = bridge.handle_primary(check_suite("abc123")).unwrap_err();
    assert!(matches!(err, DaemonError::Checks(_)), "got: {err}");
    assert_eq!(bridge.snapshot().correlated_commits, 0);

    let outcome = bridge.handle_secondary(pipeline("abc123", "success")).unwrap();
    assert!(matches!(outcome, Outcome::Ignored(IgnoreReason::NoCorrelation(_))));
}

#[test]
fn failed_update_is_reported_and_entry_survives() {
    let checks = Arc::new(FakeChecks::failing_update());
    let bridge = bridge(Some(Arc::clone(&checks)), &FakeTransport::default());
    bridge.handle_primary(check_suite("abc123")).unwrap();

    assert!(bridge.handle_secondary(pipeline("abc123", "failed")).is_err());
    assert_eq!(bridge.snapshot().correlated_commits, 1);
}

#[test]
fn repeated_check_suite_rebinds_the_commit() {
    let checks = Arc::new(FakeChecks::new());
    let bridge = bridge(Some(Arc::clone(&checks)), &FakeTransport::default());
    bridge.handle_primary(check_suite("abc123")).unwrap();
    bridge.handle_primary(check_suite("abc123")).unwrap();

    let outcome = bridge.handle_secondary(pipeline("abc123", "success")).unwrap();
    assert!(
        matches!(outcome, Outcome::CheckRunCompleted { check_run: CheckRunId(43), .. }),
        "got {outcome:?}"
    );
}

#[test]
fn other_check_suite_actions_are_ignored() {
    let checks = Arc::new(FakeChecks::new());
    let bridge = bridge(Some(Arc::clone(&checks)), &FakeTransport::default());

    for action in [CheckSuiteAction::Completed, CheckSuiteAction::Rerequested] {
        let outcome = bridge
            .handle_primary(PrimaryEvent::CheckSuite {
                action: action.clone(),
                head_sha: sha("abc123"),
            })
            .unwrap();
        assert_eq!(outcome, Outcome::Ignored(IgnoreReason::CheckSuiteAction(action)));
    }
    assert!(checks.calls().is_empty());
}

#[test]
fn mirror_only_bridge_ignores_check_traffic() {
    let bridge = bridge(None, &FakeTransport::default());
    assert_eq!(
        bridge.handle_primary(check_suite("abc123")).unwrap(),
        Outcome::Ignored(IgnoreReason::ChecksDisabled)
    );
    assert_eq!(
        bridge.handle_secondary(pipeline("abc123", "success")).unwrap(),
        Outcome::Ignored(IgnoreReason::ChecksDisabled)
    );
    assert!(!bridge.snapshot().checks_enabled);
}

// ---------------------------------------------------------------------------
// 2. Push → mirror
// ---------------------------------------------------------------------------

#[test]
fn push_mirrors_the_pushed_branch() {
    let transport = FakeTransport::default();
    let bridge = bridge(None, &transport);

    let outcome = bridge
        .handle_primary(PrimaryEvent::Push {
            git_ref: "refs/heads/feature-x".to_string(),
        })
        .unwrap();

    assert!(matches!(outcome, Outcome::Mirrored(_)), "got {outcome:?}");
    assert_eq!(
        transport.entries(),
        vec![
            "pull origin".to_string(),
            "push gitlab +refs/remotes/origin/feature-x:refs/heads/feature-x".to_string(),
        ]
    );

    let snapshot = bridge.snapshot();
    assert_eq!(snapshot.syncs_succeeded, 1);
    let last = snapshot.last_sync.expect("last sync recorded");
    assert_eq!(last.scope, "refs/heads/feature-x");
    assert_eq!(last.outcome, "updated");
}

#[test]
fn tag_push_is_rejected_without_touching_the_repository() {
    let transport = FakeTransport::default();
    let bridge = bridge(None, &transport);

    let err = bridge
        .handle_primary(PrimaryEvent::Push {
            git_ref: "refs/tags/v1.0".to_string(),
        })
        .unwrap_err();

    assert!(
        matches!(err, DaemonError::Sync(SyncError::UnsupportedRef(_))),
        "got: {err}"
    );
    assert!(transport.entries().is_empty());
    assert_eq!(bridge.snapshot().syncs_failed, 0);
}

#[test]
fn unsupported_events_are_no_ops() {
    let transport = FakeTransport::default();
    let checks = Arc::new(FakeChecks::new());
    let bridge = bridge(Some(Arc::clone(&checks)), &transport);

    let primary = bridge
        .handle_primary(PrimaryEvent::Unsupported {
            kind: "ping".to_string(),
        })
        .unwrap();
    let secondary = bridge
        .handle_secondary(SecondaryEvent::Unsupported {
            kind: "Job Hook".to_string(),
        })
        .unwrap();

    assert_eq!(
        primary,
        Outcome::Ignored(IgnoreReason::UnsupportedEvent("ping".to_string()))
    );
    assert_eq!(
        secondary,
        Outcome::Ignored(IgnoreReason::UnsupportedEvent("Job Hook".to_string()))
    );
    assert!(transport.entries().is_empty());
    assert!(checks.calls().is_empty());
}

#[test]
fn all_branches_mode_syncs_everything_on_any_push() {
    let transport = FakeTransport::default();
    let mut config = common::config();
    config.mirror_all_branches = true;
    let bridge = gitbridge_daemon::Bridge::new(
        &config,
        gitbridge_sync::MirrorSynchronizer::new(transport.clone(), "gitlab"),
        None,
    );

    bridge
        .handle_primary(PrimaryEvent::Push {
            git_ref: "refs/heads/main".to_string(),
        })
        .unwrap();

    assert_eq!(
        transport.entries().last().map(String::as_str),
        Some("push gitlab +refs/remotes/origin/*:refs/heads/*")
    );
}

#[test]
fn failed_sync_records_the_scope_that_was_attempted() {
    let push = || PrimaryEvent::Push {
        git_ref: "refs/heads/main".to_string(),
    };

    let transport = FakeTransport::failing_push();
    let single = bridge(None, &transport);
    let err = single.handle_primary(push()).unwrap_err();
    assert!(matches!(err, DaemonError::Sync(SyncError::GitFailed { .. })), "got: {err}");
    let last = single.snapshot().last_sync.expect("failure recorded");
    assert_eq!(last.scope, "refs/heads/main");

    let transport = FakeTransport::failing_push();
    let mut config = common::config();
    config.mirror_all_branches = true;
    let everything = gitbridge_daemon::Bridge::new(
        &config,
        gitbridge_sync::MirrorSynchronizer::new(transport.clone(), "gitlab"),
        None,
    );
    everything.handle_primary(push()).unwrap_err();

    let snapshot = everything.snapshot();
    assert_eq!(snapshot.syncs_failed, 1);
    let last = snapshot.last_sync.expect("failure recorded");
    assert_eq!(last.scope, "all branches");
    assert!(last.outcome.starts_with("failed:"), "got: {}", last.outcome);
}

//! Integration tests for shui-core
//!
//! These tests run real commands through the shell and drive a session the
//! way the event loop does: edit, let the debounce delay pass, then apply the
//! outcome that comes back over the channel.

use shui_core::{
    config::{EngineConfig, DEFAULT_SHELL},
    execution::{ExecutionOutcome, ShellExecutor},
    mirror::MirrorFile,
    reconciler::{Admission, Reconciler},
    session::Session,
    sinks::{MemoryResultSink, MemoryStatusSink, StatusKind},
};
use std::fs;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tempfile::tempdir;

type LiveSession = Session<ShellExecutor<ExecutionOutcome>, MemoryResultSink, MemoryStatusSink>;

fn live_session(
    timeout: Duration,
    stdin: Option<Vec<u8>>,
    mirror: Option<MirrorFile>,
) -> (LiveSession, Receiver<ExecutionOutcome>) {
    let config = EngineConfig::default();
    let (sender, receiver) = mpsc::channel::<ExecutionOutcome>();
    let executor = ShellExecutor::new(DEFAULT_SHELL, sender, |outcome| outcome);

    let reconciler = Reconciler::new(
        executor,
        MemoryResultSink::default(),
        MemoryStatusSink::default(),
        timeout,
    )
    .with_stdin(stdin)
    .with_mirror(mirror);

    (Session::new(reconciler, config.debounce_delay), receiver)
}

/// Types `command`, waits out the debounce delay and applies the result.
fn run_to_completion(
    session: &mut LiveSession,
    receiver: &Receiver<ExecutionOutcome>,
    command: &str,
) -> Duration {
    let now = Instant::now();
    session.edit_command(now, |buffer| buffer.replace(command));
    let due = session.next_deadline().expect("debounce timer should be armed");
    assert_eq!(session.fire_due(due), Some(Admission::Dispatched));

    let started = Instant::now();
    let outcome = receiver
        .recv_timeout(Duration::from_secs(20))
        .expect("execution should report back");
    let elapsed = started.elapsed();

    session.apply_outcome(outcome);
    assert!(!session.reconciler().state().is_executing());
    elapsed
}

#[test]
fn test_echo_is_shown_with_success_status() {
    let (mut session, receiver) = live_session(Duration::from_secs(30), None, None);

    run_to_completion(&mut session, &receiver, "echo hi");

    assert_eq!(session.reconciler().results().content, b"hi\n");
    let status = session.reconciler().status_sink().last().unwrap();
    assert_eq!(status.kind, StatusKind::Success);
    assert!(status.message.contains('✓'));
}

#[test]
fn test_non_zero_exit_leaves_output_unchanged() {
    let (mut session, receiver) = live_session(Duration::from_secs(30), None, None);

    run_to_completion(&mut session, &receiver, "exit 3");

    assert!(session.reconciler().results().content.is_empty());
    assert_eq!(session.reconciler().results().writes, 0);
    assert!(session.reconciler().state().last_successful_output.is_none());
    let status = session.reconciler().status_sink().last().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.message.contains('3'));
}

#[test]
fn test_failure_after_success_keeps_previous_output() {
    let (mut session, receiver) = live_session(Duration::from_secs(30), None, None);

    run_to_completion(&mut session, &receiver, "echo first");
    run_to_completion(&mut session, &receiver, "echo broken >&2; exit 1");

    assert_eq!(session.reconciler().results().content, b"first\n");
    let status = session.reconciler().status_sink().last().unwrap();
    assert_eq!(status.message, "✗ broken\n");
}

#[test]
fn test_timeout_reports_failure_quickly() {
    let (mut session, receiver) = live_session(Duration::from_secs(1), None, None);

    let elapsed = run_to_completion(&mut session, &receiver, "sleep 60");

    assert!(elapsed < Duration::from_secs(10), "took {elapsed:?}");
    assert!(session.reconciler().results().content.is_empty());
    let status = session.reconciler().status_sink().last().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.message.contains("timed out"));
}

#[test]
fn test_background_job_holding_output_does_not_wedge_the_session() {
    let (mut session, receiver) = live_session(Duration::from_secs(1), None, None);

    let elapsed = run_to_completion(&mut session, &receiver, "echo hi; sleep 30 &");

    assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
    let status = session.reconciler().status_sink().last().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.message.contains("timed out"));

    // Engine is idle again and takes the next command
    run_to_completion(&mut session, &receiver, "echo after");
    assert_eq!(session.reconciler().results().content, b"after\n");
}

#[test]
fn test_mirror_file_gets_exact_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mirror.txt");
    let (mut session, receiver) = live_session(
        Duration::from_secs(30),
        None,
        Some(MirrorFile::new(&path)),
    );

    run_to_completion(&mut session, &receiver, "echo ok");

    assert_eq!(fs::read(&path).unwrap(), b"ok\n");
}

#[test]
fn test_piped_input_feeds_commands() {
    let (mut session, receiver) = live_session(
        Duration::from_secs(30),
        Some(b"banana\napple\n".to_vec()),
        None,
    );
    session.start();
    assert_eq!(session.reconciler().results().content, b"banana\napple\n");

    run_to_completion(&mut session, &receiver, "sort");
    assert_eq!(session.reconciler().results().content, b"apple\nbanana\n");

    session.clear_command();
    assert_eq!(session.reconciler().results().content, b"banana\napple\n");
}

#[test]
fn test_unfreeze_runs_without_waiting_for_the_timer() {
    let (mut session, receiver) = live_session(Duration::from_secs(30), None, None);

    session.toggle_freeze();
    session.edit_command(Instant::now(), |buffer| buffer.replace("echo thawed"));
    session.toggle_freeze();

    let outcome = receiver.recv_timeout(Duration::from_secs(20)).unwrap();
    session.apply_outcome(outcome);

    assert_eq!(session.reconciler().results().content, b"thawed\n");
    assert!(session.next_deadline().is_none());
}

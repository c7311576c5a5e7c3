//! One editing session: the command buffer, its debounce timer, the
//! reconciler and the keystroke routing between them.
//!
//! Everything here is driven from a single event loop thread. Edits,
//! timer expiry and execution outcomes arrive as separate calls and are
//! applied in the order they are made.

use std::time::{Duration, Instant};

use log::debug;

use crate::buffer::CommandBuffer;
use crate::config::expand_path;
use crate::execution::{ExecutionOutcome, Executor};
use crate::input::{AuxKey, AuxiliaryInput, CaptureOutcome, InputMode};
use crate::mirror::MirrorFile;
use crate::reconciler::{Admission, Reconciler};
use crate::scheduler::DebounceScheduler;
use crate::sinks::{ResultSink, Status, StatusSink};

pub struct Session<X, R, S> {
    buffer: CommandBuffer,
    scheduler: DebounceScheduler,
    reconciler: Reconciler<X, R, S>,
    input_mode: InputMode,
    auxiliary: AuxiliaryInput,
}

impl<X: Executor, R: ResultSink, S: StatusSink> Session<X, R, S> {
    pub fn new(reconciler: Reconciler<X, R, S>, debounce_delay: Duration) -> Self {
        Self {
            buffer: CommandBuffer::new(),
            scheduler: DebounceScheduler::new(debounce_delay),
            reconciler,
            input_mode: InputMode::Normal,
            auxiliary: AuxiliaryInput::default(),
        }
    }

    /// Puts up the initial display.
    pub fn start(&mut self) {
        self.reconciler.start();
    }

    pub fn command(&self) -> &str {
        self.buffer.text()
    }

    pub fn into_command(self) -> String {
        self.buffer.into_text()
    }

    pub fn reconciler(&self) -> &Reconciler<X, R, S> {
        &self.reconciler
    }

    pub fn reconciler_mut(&mut self) -> &mut Reconciler<X, R, S> {
        &mut self.reconciler
    }

    pub fn scheduler(&self) -> &DebounceScheduler {
        &self.scheduler
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Text typed so far into the auxiliary field.
    pub fn auxiliary_value(&self) -> &str {
        self.auxiliary.value()
    }

    /// When the event loop next needs to call [`Session::fire_due`].
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Applies an edit to the command buffer, re-arming the debounce timer
    /// if the text changed.
    pub fn edit_command<F: FnOnce(&mut CommandBuffer)>(&mut self, now: Instant, edit: F) {
        let before = self.buffer.text().to_string();
        edit(&mut self.buffer);

        if self.buffer.text() != before {
            self.scheduler.notify_changed(self.buffer.text(), now);
        }
    }

    /// Empties the command buffer and forgets any pending execution.
    pub fn clear_command(&mut self) {
        self.buffer.clear();
        self.scheduler.cancel();
        self.reconciler.command_cleared();
    }

    pub fn clear_output(&mut self) {
        self.reconciler.clear_output();
    }

    /// Toggles freeze and returns the new frozen state.
    pub fn toggle_freeze(&mut self) -> bool {
        let admission = self.reconciler.toggle_freeze(self.buffer.text());

        // The current text already went out, the armed timer would repeat it
        if admission == Some(Admission::Dispatched) {
            self.scheduler.cancel();
        }

        self.reconciler.state().frozen
    }

    /// Starts capturing the mirror file path, pre-filled with the current one.
    pub fn begin_mirror_capture(&mut self) {
        let current = self
            .reconciler
            .mirror()
            .map(ToString::to_string)
            .unwrap_or_default();

        self.auxiliary = AuxiliaryInput::new(current);
        self.input_mode = InputMode::CapturingAuxiliaryField;
    }

    /// Feeds a key to the auxiliary field. Ignored outside capture mode.
    pub fn capture_key(&mut self, key: AuxKey) {
        if self.input_mode != InputMode::CapturingAuxiliaryField {
            return;
        }

        match self.auxiliary.handle_key(key) {
            CaptureOutcome::Editing => {}
            CaptureOutcome::Committed(value) => {
                self.input_mode = InputMode::Normal;
                let mirror = (!value.is_empty()).then(|| MirrorFile::new(expand_path(&value)));
                self.reconciler.set_mirror(mirror, self.buffer.is_empty());
            }
            CaptureOutcome::Cancelled => {
                self.input_mode = InputMode::Normal;
                self.reconciler.set_status(Status::info("Cancelled"));
            }
        }
    }

    /// Fires the debounce timer if it is due and passes the request on.
    pub fn fire_due(&mut self, now: Instant) -> Option<Admission> {
        let command = self
            .scheduler
            .fire(now, self.reconciler.state().frozen)?;

        if command != self.buffer.text() {
            debug!("Debounced `{}` no longer matches the buffer", command);
            return None;
        }

        Some(self.reconciler.request_execution(&command))
    }

    pub fn apply_outcome(&mut self, outcome: ExecutionOutcome) {
        self.reconciler.apply_outcome(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{ExecutionResult, RecordingExecutor};
    use crate::sinks::{MemoryResultSink, MemoryStatusSink, StatusKind};
    use std::fs;
    use tempfile::tempdir;

    const DELAY: Duration = Duration::from_millis(300);

    type TestSession = Session<RecordingExecutor, MemoryResultSink, MemoryStatusSink>;

    fn session() -> TestSession {
        session_with_stdin(None)
    }

    fn session_with_stdin(stdin: Option<&[u8]>) -> TestSession {
        let reconciler = Reconciler::new(
            RecordingExecutor::default(),
            MemoryResultSink::default(),
            MemoryStatusSink::default(),
            Duration::from_secs(30),
        )
        .with_stdin(stdin.map(<[u8]>::to_vec));
        Session::new(reconciler, DELAY)
    }

    fn type_text(session: &mut TestSession, text: &str, now: Instant) {
        session.edit_command(now, |buffer| buffer.replace(text));
    }

    fn dispatched(session: &TestSession) -> Vec<String> {
        session
            .reconciler()
            .executor()
            .requests
            .iter()
            .map(|request| request.command.clone())
            .collect()
    }

    fn outcome(command: &str, stdout: &[u8], exit_code: i32) -> ExecutionOutcome {
        ExecutionOutcome {
            command: command.to_string(),
            result: ExecutionResult::completed(stdout.to_vec(), Vec::new(), exit_code),
        }
    }

    #[test]
    fn test_typing_burst_executes_last_value_once() {
        let start = Instant::now();
        let mut session = session();

        for (i, c) in "pwd".chars().enumerate() {
            let now = start + Duration::from_millis(50 * i as u64);
            session.edit_command(now, |buffer| buffer.push(c));
            assert_eq!(session.fire_due(now), None);
        }

        let quiet = start + Duration::from_millis(100) + DELAY;
        assert_eq!(session.fire_due(quiet), Some(Admission::Dispatched));
        assert_eq!(session.fire_due(quiet + DELAY), None);
        assert_eq!(dispatched(&session), vec!["pwd".to_string()]);
    }

    #[test]
    fn test_unchanged_edit_does_not_arm() {
        let start = Instant::now();
        let mut session = session();

        session.edit_command(start, |_| {});
        assert!(session.next_deadline().is_none());
    }

    #[test]
    fn test_erasing_to_empty_never_executes() {
        let start = Instant::now();
        let mut session = session();

        type_text(&mut session, "l", start);
        session.edit_command(start + Duration::from_millis(10), |buffer| {
            buffer.pop();
        });

        assert!(session.next_deadline().is_none());
        assert_eq!(session.fire_due(start + DELAY * 2), None);
        assert!(dispatched(&session).is_empty());
    }

    #[test]
    fn test_fire_while_executing_is_dropped_not_queued() {
        let start = Instant::now();
        let mut session = session();

        type_text(&mut session, "sleep 5", start);
        session.fire_due(start + DELAY);

        let edited = start + DELAY + Duration::from_millis(10);
        type_text(&mut session, "sleep 6", edited);
        assert_eq!(session.fire_due(edited + DELAY), Some(Admission::Busy));

        session.apply_outcome(outcome("sleep 5", b"", 0));
        assert_eq!(session.fire_due(edited + DELAY * 3), None);
        assert_eq!(dispatched(&session), vec!["sleep 5".to_string()]);
    }

    #[test]
    fn test_result_is_applied_after_buffer_moved_on() {
        let start = Instant::now();
        let mut session = session();

        type_text(&mut session, "echo a", start);
        session.fire_due(start + DELAY);
        type_text(&mut session, "echo b", start + DELAY + Duration::from_millis(5));

        session.apply_outcome(outcome("echo a", b"a\n", 0));

        let state = session.reconciler().state();
        assert_eq!(session.reconciler().results().content, b"a\n");
        assert_eq!(state.last_successful_command.as_deref(), Some("echo a"));
        assert_eq!(session.command(), "echo b");
    }

    #[test]
    fn test_freeze_is_checked_when_timer_fires() {
        let start = Instant::now();
        let mut session = session();

        type_text(&mut session, "date", start);
        assert!(session.toggle_freeze());
        assert_eq!(session.fire_due(start + DELAY), None);
        assert!(dispatched(&session).is_empty());

        // Edits while frozen still never run
        type_text(&mut session, "date -u", start + DELAY);
        assert_eq!(session.fire_due(start + DELAY * 3), None);
        assert!(dispatched(&session).is_empty());
    }

    #[test]
    fn test_unfreeze_runs_current_text_exactly_once() {
        let start = Instant::now();
        let mut session = session();

        session.toggle_freeze();
        type_text(&mut session, "uname", start);
        assert!(!session.toggle_freeze());

        assert_eq!(dispatched(&session), vec!["uname".to_string()]);
        // The timer armed by the edit was consumed by the immediate dispatch
        session.apply_outcome(outcome("uname", b"Linux\n", 0));
        assert_eq!(session.fire_due(start + DELAY * 2), None);
        assert_eq!(dispatched(&session).len(), 1);
    }

    #[test]
    fn test_clear_command_cancels_pending_execution() {
        let start = Instant::now();
        let mut session = session();

        type_text(&mut session, "ls", start);
        session.clear_command();

        assert_eq!(session.command(), "");
        assert_eq!(session.fire_due(start + DELAY), None);
        assert!(dispatched(&session).is_empty());
    }

    #[test]
    fn test_clear_command_shows_piped_input() {
        let start = Instant::now();
        let mut session = session_with_stdin(Some(b"raw\n"));

        type_text(&mut session, "sort", start);
        session.fire_due(start + DELAY);
        session.apply_outcome(outcome("sort", b"sorted\n", 0));
        session.clear_command();

        assert_eq!(session.reconciler().results().content, b"raw\n");
    }

    #[test]
    fn test_capture_mode_routes_keys_to_auxiliary_field() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("o.txt");
        let mut session = session_with_stdin(Some(b"raw\n"));

        session.begin_mirror_capture();
        assert_eq!(session.input_mode(), InputMode::CapturingAuxiliaryField);
        for c in path.to_str().unwrap().chars() {
            session.capture_key(AuxKey::Char(c));
        }
        assert_eq!(session.auxiliary_value(), path.to_str().unwrap());
        assert_eq!(session.command(), "");

        session.capture_key(AuxKey::Enter);
        assert_eq!(session.input_mode(), InputMode::Normal);
        assert_eq!(
            session.reconciler().mirror().map(MirrorFile::path),
            Some(path.as_path())
        );
        // Empty buffer, so the piped input is mirrored right away
        assert_eq!(fs::read(&path).unwrap(), b"raw\n");
    }

    #[test]
    fn test_capture_is_seeded_with_current_mirror() {
        let mut session = session();

        session.begin_mirror_capture();
        for c in "/tmp/first".chars() {
            session.capture_key(AuxKey::Char(c));
        }
        session.capture_key(AuxKey::Enter);

        session.begin_mirror_capture();
        assert_eq!(session.auxiliary_value(), "/tmp/first");
    }

    #[test]
    fn test_capture_escape_cancels() {
        let mut session = session();

        session.begin_mirror_capture();
        session.capture_key(AuxKey::Char('x'));
        session.capture_key(AuxKey::Esc);

        assert_eq!(session.input_mode(), InputMode::Normal);
        assert!(session.reconciler().mirror().is_none());
        let status = session.reconciler().status_sink().last().cloned().unwrap();
        assert_eq!(status, Status::info("Cancelled"));
    }

    #[test]
    fn test_committing_empty_path_clears_mirror() {
        let mut session = session();

        session.begin_mirror_capture();
        session.capture_key(AuxKey::Enter);

        let status = session.reconciler().status_sink().last().cloned().unwrap();
        assert_eq!(status.kind, StatusKind::Info);
        assert_eq!(status.message, "Output file cleared");
    }

    #[test]
    fn test_capture_key_outside_capture_mode_is_ignored() {
        let mut session = session();

        session.capture_key(AuxKey::Char('x'));
        assert_eq!(session.auxiliary_value(), "");
        assert_eq!(session.input_mode(), InputMode::Normal);
    }
}

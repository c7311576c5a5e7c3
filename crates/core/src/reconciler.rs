//! The reconciler decides which executions start and what their results change.
//!
//! It is a two state machine, `Idle` and `Executing`. A request is only
//! admitted from `Idle`, for non-empty text, while not frozen; everything else
//! is dropped on the floor rather than queued. Each admitted request comes back
//! as exactly one outcome which always returns the machine to `Idle`.
//!
//! Outcomes are applied even if the command buffer has moved on since the
//! request was made. Freezing only stops new dispatches, so an outcome that was
//! already in flight is still shown.

use std::mem;
use std::time::Duration;

use log::{debug, info, warn};

use crate::execution::{ExecutionOutcome, ExecutionRequest, Executor};
use crate::mirror::MirrorFile;
use crate::sinks::{ResultSink, Status, StatusSink};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Executing {
        command: String,
    },
}

#[derive(Debug, Default)]
pub struct EngineState {
    pub frozen: bool,
    pub phase: Phase,
    pub last_successful_output: Option<Vec<u8>>,
    pub last_successful_command: Option<String>,
}

impl EngineState {
    pub fn is_executing(&self) -> bool {
        matches!(self.phase, Phase::Executing { .. })
    }
}

/// What happened to an execution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Dispatched,
    Empty,
    Frozen,
    Busy,
}

pub struct Reconciler<X, R, S> {
    executor: X,
    results: R,
    status: S,
    state: EngineState,
    stdin: Option<Vec<u8>>,
    timeout: Duration,
    mirror: Option<MirrorFile>,
}

impl<X: Executor, R: ResultSink, S: StatusSink> Reconciler<X, R, S> {
    pub fn new(executor: X, results: R, status: S, timeout: Duration) -> Self {
        Self {
            executor,
            results,
            status,
            state: EngineState::default(),
            stdin: None,
            timeout,
            mirror: None,
        }
    }

    /// Bytes piped into shui, fed to every command. Empty input counts as none.
    #[must_use]
    pub fn with_stdin(mut self, stdin: Option<Vec<u8>>) -> Self {
        self.stdin = stdin.filter(|data| !data.is_empty());
        self
    }

    #[must_use]
    pub fn with_mirror(mut self, mirror: Option<MirrorFile>) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn results(&self) -> &R {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut R {
        &mut self.results
    }

    pub fn status_sink(&self) -> &S {
        &self.status
    }

    pub fn mirror(&self) -> Option<&MirrorFile> {
        self.mirror.as_ref()
    }

    pub fn stdin(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }

    pub fn set_status(&mut self, status: Status) {
        self.status.set_status(status);
    }

    /// Initial display: the piped input if there is any, otherwise a greeting.
    pub fn start(&mut self) {
        let Some(stdin) = self.stdin.as_deref() else {
            self.status
                .set_status(Status::info("Ready. Type a command to execute."));
            return;
        };

        self.results.show(stdin);

        let status = match &self.mirror {
            Some(mirror) => match mirror.write(stdin) {
                Ok(()) => Status::success(format!("Wrote to {mirror}")),
                Err(e) => Status::error(format!("Failed to write: {e}")),
            },
            None => Status::info("Ready. Type a command to execute."),
        };
        self.status.set_status(status);
    }

    /// Admits `command` for execution if the engine can take it.
    pub fn request_execution(&mut self, command: &str) -> Admission {
        let admission = if command.is_empty() {
            Admission::Empty
        } else if self.state.frozen {
            Admission::Frozen
        } else if self.state.is_executing() {
            Admission::Busy
        } else {
            Admission::Dispatched
        };

        if admission != Admission::Dispatched {
            debug!("Dropping execution request for `{}`: {:?}", command, admission);
            return admission;
        }

        self.state.phase = Phase::Executing {
            command: command.to_string(),
        };
        self.status.set_status(Status::info("Executing..."));
        self.executor.submit(ExecutionRequest {
            command: command.to_string(),
            stdin: self.stdin.clone(),
            timeout: self.timeout,
        });

        admission
    }

    /// Applies a finished execution and returns to `Idle`.
    ///
    /// Success replaces the output (and the mirror file). Failure leaves the
    /// previous output in place and only reports through the status line.
    pub fn apply_outcome(&mut self, outcome: ExecutionOutcome) {
        let Phase::Executing { command } = mem::take(&mut self.state.phase) else {
            warn!(
                "Ignoring result for `{}`, nothing is executing",
                outcome.command
            );
            return;
        };

        if command != outcome.command {
            warn!(
                "Result for `{}` arrived while `{}` was executing",
                outcome.command, command
            );
        }

        let result = outcome.result;
        if !result.is_success() {
            info!(
                "Command `{}` failed with exit code {}",
                outcome.command, result.exit_code
            );
            self.status
                .set_status(Status::error(format!("✗ {}", result.failure_message())));
            return;
        }

        self.results.show(&result.stdout);
        self.results.scroll_to_top();

        let status = match &self.mirror {
            Some(mirror) => match mirror.write(&result.stdout) {
                Ok(()) => Status::success(format!("✓ Wrote to {mirror}")),
                Err(e) => Status::error(format!("✓ Command succeeded but failed to write: {e}")),
            },
            None => Status::success("✓ Command succeeded"),
        };
        self.status.set_status(status);

        self.state.last_successful_output = Some(result.stdout);
        self.state.last_successful_command = Some(outcome.command);
    }

    /// Flips freeze. Unfreezing with `current` non-empty re-dispatches it at
    /// once, and the admission of that request is returned.
    pub fn toggle_freeze(&mut self, current: &str) -> Option<Admission> {
        self.state.frozen = !self.state.frozen;

        if self.state.frozen {
            self.status.set_status(Status::info(
                "❄ Output frozen - editing won't trigger execution",
            ));
            return None;
        }

        self.status
            .set_status(Status::info("▶ Output unfrozen - resuming live updates"));

        if current.is_empty() || self.state.is_executing() {
            return None;
        }

        Some(self.request_execution(current))
    }

    pub fn clear_output(&mut self) {
        self.results.show(b"");
        self.state.last_successful_output = None;
        self.status.set_status(Status::info("Output cleared"));
    }

    /// The command buffer was emptied: fall back to showing the piped input.
    pub fn command_cleared(&mut self) {
        let Some(stdin) = self.stdin.as_deref() else {
            self.status.set_status(Status::info("Editor cleared"));
            return;
        };

        self.results.show(stdin);
        self.results.scroll_to_top();

        let status = match &self.mirror {
            Some(mirror) => match mirror.write(stdin) {
                Ok(()) => Status::info(format!("Editor cleared, wrote to {mirror}")),
                Err(e) => Status::error(format!("Cleared, but failed to write: {e}")),
            },
            None => Status::info("Editor cleared"),
        };
        self.status.set_status(status);
    }

    /// Sets or clears the mirror file.
    ///
    /// With an empty command buffer the piped input is what is on screen, so it
    /// is written to the new mirror straight away.
    pub fn set_mirror(&mut self, mirror: Option<MirrorFile>, command_is_empty: bool) {
        self.mirror = mirror;

        let Some(mirror) = &self.mirror else {
            self.status.set_status(Status::info("Output file cleared"));
            return;
        };

        let status = match self.stdin.as_deref() {
            Some(stdin) if command_is_empty => match mirror.write(stdin) {
                Ok(()) => Status::success(format!("Wrote to {mirror}")),
                Err(e) => Status::error(format!("Failed to write: {e}")),
            },
            _ => Status::info(format!("Output file set: {mirror}")),
        };
        self.status.set_status(status);
    }
}

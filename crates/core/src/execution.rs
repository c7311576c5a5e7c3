//! Running commands through the shell.
//!
//! [`run_shell_command`] does the blocking work: spawn `<shell> -c <command>`,
//! feed it the piped input, capture both output streams and enforce the
//! timeout. [`ShellExecutor`] moves that work onto a worker thread and posts
//! the outcome back to the event loop as a message, so the loop never blocks.

use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use wait_timeout::ChildExt;

use crate::error::RunError;

/// Exit code reported when the command could not run to completion
/// (spawn failure, timeout, signal).
pub const EXECUTION_FAILURE_EXIT_CODE: i32 = -1;

/// Everything captured from one command run.
#[derive(Debug)]
pub struct ExecutionResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i32,
    pub run_error: Option<RunError>,
}

impl ExecutionResult {
    /// A process that ran to completion with an exit code.
    pub fn completed(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: i32) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            run_error: None,
        }
    }

    /// A run that never produced an exit code of its own.
    pub fn failed(run_error: RunError) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: EXECUTION_FAILURE_EXIT_CODE,
            run_error: Some(run_error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.run_error.is_none() && self.exit_code == 0
    }

    /// Text describing why the run failed.
    ///
    /// Prefers what the command wrote to stderr, then the run error, then the
    /// bare exit code.
    pub fn failure_message(&self) -> String {
        if !self.stderr.is_empty() {
            return String::from_utf8_lossy(&self.stderr).into_owned();
        }

        if let Some(run_error) = &self.run_error {
            return run_error.to_string();
        }

        format!("Exit code: {}", self.exit_code)
    }
}

/// A command admitted for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub command: String,
    pub stdin: Option<Vec<u8>>,
    pub timeout: Duration,
}

/// A finished run, tagged with the command text it was started for.
#[derive(Debug)]
pub struct ExecutionOutcome {
    pub command: String,
    pub result: ExecutionResult,
}

/// Starts commands and later reports each of them exactly once.
pub trait Executor {
    fn submit(&mut self, request: ExecutionRequest);
}

/// Runs `request` through `shell -c` and waits for it, at most `request.timeout`.
///
/// The timeout covers both the shell exiting and its output streams closing,
/// so a background job that keeps the pipes open is killed with the rest of
/// the process group.
///
/// Standard input is only connected when there are bytes to feed; otherwise the
/// command sees a closed stdin instead of the terminal.
pub fn run_shell_command(shell: &str, request: &ExecutionRequest) -> ExecutionResult {
    let deadline = Instant::now() + request.timeout;
    let stdin_data = request.stdin.as_deref().filter(|data| !data.is_empty());

    let mut command = Command::new(shell);
    command
        .arg("-c")
        .arg(&request.command)
        .stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Own process group, so a timeout can take down the whole pipeline
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    debug!("Executing `{}` with {}", request.command, shell);

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(source) => {
            warn!("Error spawning subprocess: {}", source);
            return ExecutionResult::failed(RunError::Spawn {
                shell: shell.to_string(),
                source,
            });
        }
    };

    // Never joined: a background job holding stdin could block it forever
    if let (Some(mut pipe), Some(data)) = (child.stdin.take(), stdin_data) {
        let data = data.to_vec();
        thread::spawn(move || {
            // The command may exit without reading everything
            if let Err(e) = pipe.write_all(&data) {
                debug!("Stopped feeding stdin: {}", e);
            }
        });
    }
    let stdout_reader = spawn_reader(child.stdout.take());
    let stderr_reader = spawn_reader(child.stderr.take());

    let status = match child.wait_timeout(request.timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            info!(
                "Command `{}` exceeded {:?}, killing it",
                request.command, request.timeout
            );
            terminate(&mut child);
            return ExecutionResult::failed(RunError::Timeout(request.timeout));
        }
        Err(e) => {
            terminate(&mut child);
            return ExecutionResult::failed(RunError::Wait(e));
        }
    };

    let stdout = collect(stdout_reader, deadline);
    let stderr = collect(stderr_reader, deadline);
    let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
        info!(
            "Output of `{}` still open after {:?}, killing its process group",
            request.command, request.timeout
        );
        terminate(&mut child);
        return ExecutionResult::failed(RunError::Timeout(request.timeout));
    };

    exit_result(status, stdout, stderr)
}

/// Reads `pipe` to the end on its own thread and sends the bytes once it closes.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    pipe.map(|mut pipe| {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut buffer = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut buffer) {
                debug!("Error reading subprocess output: {}", e);
            }
            let _ = sender.send(buffer);
        });
        receiver
    })
}

/// Waits for a reader until `deadline`. `None` means the stream is still open.
fn collect(reader: Option<Receiver<Vec<u8>>>, deadline: Instant) -> Option<Vec<u8>> {
    let Some(reader) = reader else {
        return Some(Vec::new());
    };

    match reader.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(buffer) => Some(buffer),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(Vec::new()),
    }
}

fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        // The child leads its own process group, see `run_shell_command`
        if let Ok(pid) = libc::pid_t::try_from(child.id()) {
            // SAFETY: kill(2) has no memory safety requirements
            unsafe {
                libc::kill(-pid, libc::SIGKILL);
            }
        }
    }

    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
fn exit_result(status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> ExecutionResult {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => ExecutionResult::completed(stdout, stderr, code),
        (None, Some(signal)) => ExecutionResult {
            stdout,
            stderr,
            exit_code: EXECUTION_FAILURE_EXIT_CODE,
            run_error: Some(RunError::Signaled(signal)),
        },
        (None, None) => ExecutionResult::completed(stdout, stderr, EXECUTION_FAILURE_EXIT_CODE),
    }
}

#[cfg(not(unix))]
fn exit_result(status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> ExecutionResult {
    ExecutionResult::completed(
        stdout,
        stderr,
        status.code().unwrap_or(EXECUTION_FAILURE_EXIT_CODE),
    )
}

/// Executes requests on worker threads and posts outcomes into a channel.
///
/// `wrap` turns an outcome into whatever message type the receiving loop uses.
pub struct ShellExecutor<T> {
    shell: String,
    sender: Sender<T>,
    wrap: fn(ExecutionOutcome) -> T,
}

impl<T: Send + 'static> ShellExecutor<T> {
    pub fn new(shell: impl Into<String>, sender: Sender<T>, wrap: fn(ExecutionOutcome) -> T) -> Self {
        Self {
            shell: shell.into(),
            sender,
            wrap,
        }
    }
}

impl<T: Send + 'static> Executor for ShellExecutor<T> {
    fn submit(&mut self, request: ExecutionRequest) {
        let shell = self.shell.clone();
        let sender = self.sender.clone();
        let wrap = self.wrap;
        let command = request.command.clone();

        let spawned = thread::Builder::new()
            .name("shui-executor".to_string())
            .spawn(move || {
                let result = run_shell_command(&shell, &request);
                let outcome = ExecutionOutcome {
                    command: request.command,
                    result,
                };
                if sender.send(wrap(outcome)).is_err() {
                    debug!("Event loop is gone, dropping execution result");
                }
            });

        if let Err(source) = spawned {
            error!("Could not start executor thread: {}", source);
            let outcome = ExecutionOutcome {
                command,
                result: ExecutionResult::failed(RunError::Spawn {
                    shell: self.shell.clone(),
                    source,
                }),
            };
            let _ = self.sender.send((self.wrap)(outcome));
        }
    }
}

/// Executor that only records what it was asked to run.
///
/// Outcomes are fed back by hand, which makes the engine easy to drive
/// without real processes.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub requests: Vec<ExecutionRequest>,
}

impl Executor for RecordingExecutor {
    fn submit(&mut self, request: ExecutionRequest) {
        self.requests.push(request);
    }
}

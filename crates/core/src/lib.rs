//! Shui Core Library
//!
//! This crate provides the live-preview engine behind shui, a terminal tool
//! that re-runs a shell command as it is being typed and shows its output.
//!
//! # Key Features
//!
//! - **Debouncing**: Bursts of edits collapse into a single execution
//! - **Execution**: Commands run through the shell with a timeout, off the event loop
//! - **Reconciliation**: One execution at a time; failures never wipe good output
//! - **Freeze**: Suspend new executions while keeping the current output
//! - **Mirror File**: Keep a file in sync with the last successful output
//! - **Shell Integration**: Snippets that put the final command on the prompt
//!
//! # Examples
//!
//! Driving a session by hand, with executions recorded instead of run:
//!
//! ```
//! use std::time::{Duration, Instant};
//!
//! use shui_core::execution::RecordingExecutor;
//! use shui_core::reconciler::Reconciler;
//! use shui_core::session::Session;
//! use shui_core::sinks::{MemoryResultSink, MemoryStatusSink};
//!
//! let reconciler = Reconciler::new(
//!     RecordingExecutor::default(),
//!     MemoryResultSink::default(),
//!     MemoryStatusSink::default(),
//!     Duration::from_secs(30),
//! );
//! let mut session = Session::new(reconciler, Duration::from_millis(300));
//!
//! let now = Instant::now();
//! session.edit_command(now, |buffer| buffer.replace("echo hi"));
//! session.fire_due(now + Duration::from_millis(300));
//!
//! assert_eq!(session.reconciler().executor().requests[0].command, "echo hi");
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod execution;
pub mod input;
pub mod mirror;
pub mod reconciler;
pub mod scheduler;
pub mod session;
pub mod shell_init;
pub mod sinks;

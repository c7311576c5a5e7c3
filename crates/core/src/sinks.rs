//! Narrow interfaces to the panes that show results.
//!
//! The engine only ever pushes finished content and status lines through
//! these traits; how they are drawn is up to the implementor.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusKind {
    #[default]
    Info,
    Success,
    Error,
}

/// A human readable status line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receives finished command output.
pub trait ResultSink {
    /// Replaces everything shown with `content`.
    fn show(&mut self, content: &[u8]);

    fn scroll_to_top(&mut self);
}

/// Receives status messages.
pub trait StatusSink {
    fn set_status(&mut self, status: Status);
}

/// Result sink that keeps the content in memory.
#[derive(Debug, Default)]
pub struct MemoryResultSink {
    pub content: Vec<u8>,
    pub writes: usize,
    pub scroll_resets: usize,
}

impl ResultSink for MemoryResultSink {
    fn show(&mut self, content: &[u8]) {
        self.content = content.to_vec();
        self.writes += 1;
    }

    fn scroll_to_top(&mut self) {
        self.scroll_resets += 1;
    }
}

/// Status sink that remembers every status it was given.
#[derive(Debug, Default)]
pub struct MemoryStatusSink {
    pub history: Vec<Status>,
}

impl MemoryStatusSink {
    pub fn last(&self) -> Option<&Status> {
        self.history.last()
    }
}

impl StatusSink for MemoryStatusSink {
    fn set_status(&mut self, status: Status) {
        self.history.push(status);
    }
}

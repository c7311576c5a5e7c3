//! Debouncing of command edits.
//!
//! Every edit re-arms a single timer. Only when the timer runs out without
//! another edit is the captured text handed on for execution. The scheduler
//! holds no thread of its own: the event loop asks for [`DebounceScheduler::next_due`]
//! to know how long to wait, then calls [`DebounceScheduler::fire`].

use std::time::{Duration, Instant};

use log::trace;

/// An armed timer and the exact text it was armed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExecution {
    pub command: String,
    pub due: Instant,
}

#[derive(Debug)]
pub struct DebounceScheduler {
    delay: Duration,
    pending: Option<PendingExecution>,
}

impl DebounceScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records an edit. Replaces any armed timer; empty text leaves none armed.
    pub fn notify_changed(&mut self, text: &str, now: Instant) {
        if text.is_empty() {
            self.pending = None;
            return;
        }

        trace!("Debounce armed for `{}`", text);
        self.pending = Some(PendingExecution {
            command: text.to_string(),
            due: now + self.delay,
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&PendingExecution> {
        self.pending.as_ref()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.due)
    }

    /// Consumes the timer if it is due and returns the text to execute.
    ///
    /// A due timer is consumed even when `frozen`, in which case nothing is
    /// returned.
    pub fn fire(&mut self, now: Instant, frozen: bool) -> Option<String> {
        if self.pending.as_ref()?.due > now {
            return None;
        }

        let pending = self.pending.take()?;
        if frozen {
            trace!("Debounce for `{}` fired while frozen", pending.command);
            return None;
        }

        Some(pending.command)
    }
}

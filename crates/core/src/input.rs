//! Keystroke routing between the command buffer and the auxiliary field.
//!
//! While the auxiliary field is being captured (for example the mirror file
//! path) it owns every keystroke, including the ones that would otherwise
//! quit or toggle freeze.

/// Where keystrokes currently go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    CapturingAuxiliaryField,
}

/// The keys the auxiliary field understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxKey {
    Enter,
    Esc,
    Backspace,
    Char(char),
    Other,
}

/// What a keystroke did to the auxiliary field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Still capturing.
    Editing,
    /// Capture finished with this value.
    Committed(String),
    /// Capture abandoned, nothing changes.
    Cancelled,
}

/// A single-line value being typed outside the command buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxiliaryInput {
    value: String,
}

impl AuxiliaryInput {
    /// Starts a capture pre-filled with `initial`.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            value: initial.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn handle_key(&mut self, key: AuxKey) -> CaptureOutcome {
        match key {
            AuxKey::Enter => CaptureOutcome::Committed(std::mem::take(&mut self.value)),
            AuxKey::Esc => {
                self.value.clear();
                CaptureOutcome::Cancelled
            }
            AuxKey::Backspace => {
                self.value.pop();
                CaptureOutcome::Editing
            }
            AuxKey::Char(c) if !c.is_control() => {
                self.value.push(c);
                CaptureOutcome::Editing
            }
            AuxKey::Char(_) | AuxKey::Other => CaptureOutcome::Editing,
        }
    }
}

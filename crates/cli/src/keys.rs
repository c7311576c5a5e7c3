//! Mapping of terminal key presses to what they do.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use shui_core::input::AuxKey;

/// What a key press asks for in normal editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ClearCommand,
    ClearOutput,
    ToggleFreeze,
    EditOutputFile,
    ScrollUp,
    ScrollDown,
    Insert(char),
    DeleteBack,
    Ignore,
}

/// Hints shown on the help line, in display order.
pub const KEY_HINTS: [(&str, &str); 6] = [
    ("^C", "quit"),
    ("^D", "clear"),
    ("^L", "clear out"),
    ("^F", "freeze"),
    ("^O", "output file"),
    ("pgup/dn", "scroll"),
];

pub fn action_for_key(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('d') => Action::ClearCommand,
            KeyCode::Char('l') => Action::ClearOutput,
            KeyCode::Char('f') => Action::ToggleFreeze,
            KeyCode::Char('o') => Action::EditOutputFile,
            _ => Action::Ignore,
        };
    }

    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::PageUp => Action::ScrollUp,
        KeyCode::PageDown => Action::ScrollDown,
        KeyCode::Enter => Action::Insert('\n'),
        KeyCode::Tab => Action::Insert('\t'),
        KeyCode::Backspace => Action::DeleteBack,
        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::ALT) => Action::Ignore,
        KeyCode::Char(c) => Action::Insert(c),
        _ => Action::Ignore,
    }
}

/// Key as seen by the auxiliary field while it is being captured.
pub fn aux_key(key: KeyEvent) -> AuxKey {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return AuxKey::Other;
    }

    match key.code {
        KeyCode::Enter => AuxKey::Enter,
        KeyCode::Esc => AuxKey::Esc,
        KeyCode::Backspace => AuxKey::Backspace,
        KeyCode::Char(c) => AuxKey::Char(c),
        _ => AuxKey::Other,
    }
}

//! The command buffer holding the text the user is editing.

/// Text of the command being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuffer {
    text: String,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn replace(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Removes the last character, if any.
    pub fn pop(&mut self) -> Option<char> {
        self.text.pop()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

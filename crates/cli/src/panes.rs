//! Screen regions and the state behind them.
//!
//! The output pane and the status line are the terminal side of the engine's
//! result and status sinks. They only hold what is to be drawn; drawing
//! happens in [`crate::ui`].

use shui_core::sinks::{ResultSink, Status, StatusSink};

const MIN_EDITOR_HEIGHT: u16 = 5;
const MAX_EDITOR_HEIGHT: u16 = 10;

/// Rows given to each region for a terminal size.
///
/// From the top: editor box, output box, status line, help line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub editor_height: u16,
    pub output_height: u16,
}

impl Layout {
    pub fn from_size(width: u16, height: u16) -> Self {
        let editor_height = (u32::from(height) * 3 / 10)
            .clamp(u32::from(MIN_EDITOR_HEIGHT), u32::from(MAX_EDITOR_HEIGHT))
            as u16;
        let output_height = height.saturating_sub(editor_height + 2);

        Self {
            width,
            editor_height,
            output_height,
        }
    }

    pub fn output_top(&self) -> u16 {
        self.editor_height
    }

    pub fn status_row(&self) -> u16 {
        self.editor_height + self.output_height
    }

    pub fn help_row(&self) -> u16 {
        self.status_row() + 1
    }

    /// Lines of output visible inside the output box border.
    pub fn output_rows(&self) -> usize {
        usize::from(self.output_height.saturating_sub(2))
    }

    /// Lines of command visible inside the editor box border.
    pub fn editor_rows(&self) -> usize {
        usize::from(self.editor_height.saturating_sub(2))
    }
}

/// Scrollable view over the last output shown.
#[derive(Debug, Default)]
pub struct OutputPane {
    lines: Vec<String>,
    offset: usize,
    viewport_height: usize,
}

impl OutputPane {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn page_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.viewport_height.max(1));
    }

    pub fn page_down(&mut self) {
        self.offset = (self.offset + self.viewport_height.max(1)).min(self.max_offset());
    }

    pub fn visible_lines(&self) -> &[String] {
        let end = (self.offset + self.viewport_height).min(self.lines.len());
        &self.lines[self.offset.min(end)..end]
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_height)
    }
}

/// Makes command output safe to print into a fixed cell grid.
pub(crate) fn displayable_line(line: &str) -> String {
    line.replace('\t', "    ")
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}

impl ResultSink for OutputPane {
    fn show(&mut self, content: &[u8]) {
        self.lines = String::from_utf8_lossy(content)
            .lines()
            .map(displayable_line)
            .collect();
        self.offset = self.offset.min(self.max_offset());
    }

    fn scroll_to_top(&mut self) {
        self.offset = 0;
    }
}

#[derive(Debug, Default)]
pub struct StatusLine {
    status: Status,
}

impl StatusLine {
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// The status flattened to one line and cut to fit `width` columns.
    pub fn display_text(&self, width: u16) -> String {
        let flattened = self
            .status
            .message
            .replace('\r', "")
            .replace('\n', " ")
            .trim()
            .to_string();

        let max_len = usize::from(width.saturating_sub(4));
        if max_len > 0 && flattened.chars().count() > max_len {
            let kept: String = flattened.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        } else {
            flattened
        }
    }
}

impl StatusSink for StatusLine {
    fn set_status(&mut self, status: Status) {
        self.status = status;
    }
}

use std::io::{stderr, Write};

use crossterm::cursor::{self, MoveTo};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use itertools::Itertools;
use shui_core::error::Result;

use crate::keys::KEY_HINTS;
use crate::panes::{displayable_line, Layout, OutputPane, StatusLine};
use crate::theme::Theme;

const PROMPT: &str = "$ ";
const CURSOR: char = '█';

/// Holds the terminal in raw mode on the alternate screen until dropped.
///
/// Everything is drawn on stderr so stdout stays free for the final command.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = RawModeGuard;
        execute!(stderr(), EnterAlternateScreen, EnableBracketedPaste, cursor::Hide)?;
        Ok(guard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stderr(),
            DisableBracketedPaste,
            cursor::Show,
            LeaveAlternateScreen
        );
    }
}

/// Everything needed to draw one frame.
pub struct View<'a> {
    pub command: &'a str,
    pub output: &'a OutputPane,
    pub status: &'a StatusLine,
    pub frozen: bool,
    pub executing: bool,
    pub mirror: Option<String>,
    /// Value of the output file field while it is being edited.
    pub capture: Option<&'a str>,
}

fn fit(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Lines shown in the editor box, keeping the end of the command in view.
fn editor_lines(command: &str, rows: usize) -> Vec<String> {
    let mut lines: Vec<String> = command
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let lead = if i == 0 { PROMPT } else { "  " };
            format!("{lead}{}", displayable_line(line))
        })
        .collect();

    if let Some(last) = lines.last_mut() {
        last.push(CURSOR);
    }

    let skip = lines.len().saturating_sub(rows);
    lines.split_off(skip)
}

fn help_text(view: &View<'_>) -> String {
    if view.capture.is_some() {
        return "enter: confirm • esc: cancel".to_string();
    }

    let mut help = KEY_HINTS
        .iter()
        .map(|(key, description)| format!("{key} {description}"))
        .join(" • ");

    if view.frozen {
        help.push_str(" [❄ FROZEN]");
    }
    if let Some(mirror) = &view.mirror {
        help.push_str(&format!(" [-> {mirror}]"));
    }

    help
}

fn draw_box<W: Write>(
    out: &mut W,
    top: u16,
    height: u16,
    width: u16,
    border: Color,
    title: &str,
    lines: &[String],
) -> Result<()> {
    if height < 2 || width < 4 {
        return Ok(());
    }

    let inner = usize::from(width - 2);
    let title = fit(title, inner);
    let top_border = format!("╭{title}{}╮", "─".repeat(inner - title.chars().count()));
    let bottom_border = format!("╰{}╯", "─".repeat(inner));

    queue!(
        out,
        MoveTo(0, top),
        SetForegroundColor(border),
        Print(top_border),
        ResetColor
    )?;

    for row in 0..height - 2 {
        let line = lines.get(usize::from(row)).map(String::as_str).unwrap_or("");
        let content = fit(line, inner - 2);
        let padding = " ".repeat(inner - 2 - content.chars().count());

        queue!(
            out,
            MoveTo(0, top + 1 + row),
            SetForegroundColor(border),
            Print("│ "),
            ResetColor,
            Print(content),
            Print(padding),
            SetForegroundColor(border),
            Print(" │"),
            ResetColor
        )?;
    }

    queue!(
        out,
        MoveTo(0, top + height - 1),
        SetForegroundColor(border),
        Print(bottom_border),
        ResetColor
    )?;

    Ok(())
}

/// Redraws the whole screen.
pub fn draw<W: Write>(out: &mut W, view: &View<'_>, theme: &Theme, layout: &Layout) -> Result<()> {
    let width = usize::from(layout.width);

    queue!(out, Clear(ClearType::All))?;

    let editor_border = if view.capture.is_some() {
        theme.border
    } else {
        theme.focused_border
    };
    draw_box(
        out,
        0,
        layout.editor_height,
        layout.width,
        editor_border,
        "─ command ",
        &editor_lines(view.command, layout.editor_rows()),
    )?;

    let output_title = if view.executing {
        "─ output · running "
    } else {
        "─ output "
    };
    draw_box(
        out,
        layout.output_top(),
        layout.output_height,
        layout.width,
        theme.border,
        output_title,
        view.output.visible_lines(),
    )?;

    queue!(out, MoveTo(0, layout.status_row()), Clear(ClearType::CurrentLine))?;
    match view.capture {
        Some(value) => queue!(
            out,
            SetForegroundColor(theme.info),
            Print(fit(&format!("Output file: {value}{CURSOR}"), width)),
            ResetColor
        )?,
        None => queue!(
            out,
            SetForegroundColor(theme.status_color(view.status.status().kind)),
            Print(view.status.display_text(layout.width)),
            ResetColor
        )?,
    }

    queue!(
        out,
        MoveTo(0, layout.help_row()),
        Clear(ClearType::CurrentLine),
        SetForegroundColor(theme.help),
        Print(fit(&help_text(view), width)),
        ResetColor
    )?;

    out.flush()?;
    Ok(())
}

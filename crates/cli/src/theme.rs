use crossterm::style::Color;
use shui_core::config::{ColorDefinition, ThemeSettings};
use shui_core::error::{Error, Result};
use shui_core::sinks::StatusKind;

/// Conversion of a settings file color into a terminal color.
pub trait AsTermColor {
    fn as_crossterm_color(&self) -> Result<Option<Color>>;
}

impl AsTermColor for ColorDefinition {
    fn as_crossterm_color(&self) -> Result<Option<Color>> {
        match (self.rgb, self.ansi, self.name.as_deref()) {
            (None, None, None) => Ok(None),
            (Some((r, g, b)), None, None) => Ok(Some(Color::Rgb { r, g, b })),
            (None, Some(value), None) => Ok(Some(Color::AnsiValue(value))),
            (None, None, Some(name)) => named_color(name).map(Some),
            _ => Err(Error::MultipleColorTypes),
        }
    }
}

/// Looks up one of the sixteen basic colors. Case, `_`, `-` and spaces are ignored.
fn named_color(name: &str) -> Result<Color> {
    let normalized: String = name
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect();

    let color = match normalized.as_str() {
        "black" => Color::Black,
        "darkgrey" | "darkgray" => Color::DarkGrey,
        "red" => Color::Red,
        "darkred" => Color::DarkRed,
        "green" => Color::Green,
        "darkgreen" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "darkyellow" => Color::DarkYellow,
        "blue" => Color::Blue,
        "darkblue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "darkmagenta" => Color::DarkMagenta,
        "cyan" => Color::Cyan,
        "darkcyan" => Color::DarkCyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        _ => return Err(Error::UnknownColorName(name.to_string())),
    };
    Ok(color)
}

fn color_or(definition: &Option<ColorDefinition>, fallback: Color) -> Result<Color> {
    match definition {
        None => Ok(fallback),
        Some(definition) => Ok(definition.as_crossterm_color()?.unwrap_or(fallback)),
    }
}

/// Colors used when drawing. Built once at startup and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub border: Color,
    pub focused_border: Color,
    pub success: Color,
    pub error: Color,
    pub info: Color,
    pub help: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Color::AnsiValue(240),
            focused_border: Color::AnsiValue(62),
            success: Color::AnsiValue(42),
            error: Color::AnsiValue(196),
            info: Color::AnsiValue(39),
            help: Color::AnsiValue(241),
        }
    }
}

impl Theme {
    /// Overlays the colors from the settings file onto the defaults.
    pub fn from_settings(settings: &ThemeSettings) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            border: color_or(&settings.border, defaults.border)?,
            focused_border: color_or(&settings.focused_border, defaults.focused_border)?,
            success: color_or(&settings.success, defaults.success)?,
            error: color_or(&settings.error, defaults.error)?,
            info: color_or(&settings.info, defaults.info)?,
            help: color_or(&settings.help, defaults.help)?,
        })
    }

    pub fn status_color(&self, kind: StatusKind) -> Color {
        match kind {
            StatusKind::Info => self.info,
            StatusKind::Success => self.success,
            StatusKind::Error => self.error,
        }
    }
}

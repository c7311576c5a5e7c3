//! Configuration for shui.
//!
//! Settings come from an optional YAML file (by default `~/.shui/config.yml`)
//! and are then overridden by command-line flags. Paths given by the user may
//! contain `~`, which is expanded here.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Default path for the settings file
const DEFAULT_CONFIG_PATH: &str = "~/.shui/config.yml";

/// Default shell used to interpret commands
pub const DEFAULT_SHELL: &str = "sh";

/// Quiet period after the last edit before a command runs
pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Longest a single command may run before it is killed
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A color as written in the settings file.
///
/// Exactly one of the three forms should be given.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ColorDefinition {
    pub rgb: Option<(u8, u8, u8)>,
    pub ansi: Option<u8>,
    pub name: Option<String>,
}

impl ColorDefinition {
    pub fn ansi(value: u8) -> Self {
        Self {
            rgb: None,
            ansi: Some(value),
            name: None,
        }
    }
}

/// Color overrides for the terminal panes.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ThemeSettings {
    pub border: Option<ColorDefinition>,
    pub focused_border: Option<ColorDefinition>,
    pub success: Option<ColorDefinition>,
    pub error: Option<ColorDefinition>,
    pub info: Option<ColorDefinition>,
    pub help: Option<ColorDefinition>,
}

/// Contents of the settings file. Every field is optional.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub debounce_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub shell: Option<String>,
    #[serde(default)]
    pub theme: ThemeSettings,
}

/// Values the engine runs with once the file and the flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub debounce_delay: Duration,
    pub timeout: Duration,
    pub shell: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_delay: DEFAULT_DEBOUNCE_DELAY,
            timeout: DEFAULT_TIMEOUT,
            shell: DEFAULT_SHELL.to_string(),
        }
    }
}

impl EngineConfig {
    /// Builds the engine configuration from settings, with flag overrides taking priority.
    pub fn resolve(
        settings: &Settings,
        debounce_ms: Option<u64>,
        timeout_secs: Option<u64>,
        shell: Option<String>,
    ) -> Self {
        let defaults = Self::default();

        Self {
            debounce_delay: debounce_ms
                .or(settings.debounce_ms)
                .map_or(defaults.debounce_delay, Duration::from_millis),
            timeout: timeout_secs
                .or(settings.timeout_secs)
                .map_or(defaults.timeout, Duration::from_secs),
            shell: shell
                .or_else(|| settings.shell.clone())
                .unwrap_or(defaults.shell),
        }
    }
}

/// Resolves the settings file path.
///
/// If a custom path is provided, uses that path. Otherwise, uses the default
/// settings path. Shell expansions like `~` are resolved.
///
/// # Examples
///
/// ```
/// use shui_core::config::get_config_path;
///
/// let default_path = get_config_path(&None);
/// assert!(default_path.ends_with("config.yml"));
/// ```
pub fn get_config_path(config_path_arg: &Option<String>) -> String {
    let config_path = match config_path_arg {
        Some(config_path) => config_path,
        None => DEFAULT_CONFIG_PATH,
    };

    shellexpand::tilde(config_path).to_string()
}

/// Expands `~` in a user supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Reads the settings file.
///
/// A file that does not exist yields default settings.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or is not valid YAML.
pub fn load_settings(config_path: &str) -> Result<Settings> {
    if !Path::exists(Path::new(config_path)) {
        debug!("No settings file at `{}`, using defaults", config_path);
        return Ok(Settings::default());
    }

    let contents = fs::read_to_string(config_path)
        .map_err(|e| Error::io_error("settings".to_string(), config_path.to_string(), e))?;

    // serde_yaml rejects an empty document, so treat it as "no settings"
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(&contents).map_err(|e| {
        Error::yaml_error(
            "reading".to_string(),
            "settings".to_string(),
            config_path.to_string(),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_get_config_path_with_custom_path() {
        let custom_path = Some("/custom/path/config.yml".to_string());
        let result = get_config_path(&custom_path);
        assert_eq!(result, "/custom/path/config.yml");
    }

    #[test]
    fn test_get_config_path_with_none() {
        let result = get_config_path(&None);
        // Should expand the tilde in the default path
        assert!(result.contains("config.yml"));
        assert!(!result.starts_with('~'));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let result = expand_path("~/out.txt");
        assert!(!result.to_string_lossy().starts_with('~'));
        assert!(result.ends_with("out.txt"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        assert_eq!(expand_path("/tmp/out.txt"), PathBuf::from("/tmp/out.txt"));
    }

    #[test]
    fn test_load_settings_missing_file() {
        let settings = load_settings("/definitely/not/here/config.yml").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_empty_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        let settings = load_settings(path).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_full_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            r#"
debounce_ms: 150
timeout_secs: 5
shell: bash
theme:
  success:
    name: green
  error:
    ansi: 160
"#
        )
        .unwrap();

        let settings = load_settings(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(settings.debounce_ms, Some(150));
        assert_eq!(settings.timeout_secs, Some(5));
        assert_eq!(settings.shell, Some("bash".to_string()));
        assert_eq!(settings.theme.error, Some(ColorDefinition::ansi(160)));
        assert_eq!(
            settings.theme.success.and_then(|c| c.name),
            Some("green".to_string())
        );
        assert!(settings.theme.border.is_none());
    }

    #[test]
    fn test_load_settings_invalid_yaml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "debounce_ms: [not a number").unwrap();

        let result = load_settings(temp_file.path().to_str().unwrap());
        assert!(matches!(result, Err(Error::Yaml { .. })));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = EngineConfig::resolve(&Settings::default(), None, None, None);
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.debounce_delay, Duration::from_millis(300));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.shell, "sh");
    }

    #[test]
    fn test_resolve_flags_override_settings() {
        let settings = Settings {
            debounce_ms: Some(100),
            timeout_secs: Some(10),
            shell: Some("bash".to_string()),
            theme: ThemeSettings::default(),
        };

        let from_file = EngineConfig::resolve(&settings, None, None, None);
        assert_eq!(from_file.debounce_delay, Duration::from_millis(100));
        assert_eq!(from_file.timeout, Duration::from_secs(10));
        assert_eq!(from_file.shell, "bash");

        let overridden =
            EngineConfig::resolve(&settings, Some(50), Some(2), Some("zsh".to_string()));
        assert_eq!(overridden.debounce_delay, Duration::from_millis(50));
        assert_eq!(overridden.timeout, Duration::from_secs(2));
        assert_eq!(overridden.shell, "zsh");
    }
}

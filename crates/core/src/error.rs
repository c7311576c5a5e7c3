use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Terminal error: {}", _0)]
    Terminal(#[from] std::io::Error),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("For a color, only one of `rgb`, `ansi` or `name` should be defined.")]
    MultipleColorTypes,

    #[error("Unknown color name: \"{}\"", _0)]
    UnknownColorName(String),

    #[error("Unsupported shell: {}\nSupported shells: zsh, bash", _0)]
    UnsupportedShell(String),

    #[error("Usage: shui init <shell>\nSupported shells: zsh, bash")]
    MissingShell,

    #[error("Error reading stdin: {}", .0)]
    Stdio(std::io::Error),
}

impl Error {
    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }
}

/// Ways a command can fail without producing an ordinary exit status.
///
/// All of these are reported with [`crate::execution::EXECUTION_FAILURE_EXIT_CODE`]
/// so they can be told apart from a command that ran and exited non-zero.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to start `{}`: {}", .shell, .source)]
    Spawn {
        shell: String,
        source: std::io::Error,
    },

    #[error("Command timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Failed waiting for command: {}", .0)]
    Wait(std::io::Error),

    #[error("Command terminated by signal {}", .0)]
    Signaled(i32),
}

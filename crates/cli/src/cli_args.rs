//! Command-line argument parsing.
//!
//! This module defines the command-line interface structure using the `clap`
//! crate. Flags here override the settings file.

use clap::{Parser, Subcommand};

/// Command-line arguments for the shui binary.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use shui_cli::cli_args::Args;
///
/// let args = Args::parse_from(["shui", "-o", "out.txt"]);
/// assert_eq!(args.output_file.as_deref(), Some("out.txt"));
/// ```
#[derive(Parser, Debug)] // requires `derive` feature
#[command(name = "shui", term_width = 0)] // Just to make testing across clap features easier
pub struct Args {
    #[command(subcommand)]
    pub command: Option<SubCommand>,

    /// File to keep in sync with the output of the last successful command.
    ///
    /// Can also be set or cleared from inside shui with Ctrl+O.
    #[arg(long, short = 'o')]
    pub output_file: Option<String>,

    /// Path to the settings file YAML.
    ///
    /// If not provided, defaults to `~/.shui/config.yml`.
    #[arg(long, short = 'c')]
    pub config_path: Option<String>,

    /// Seconds a command may run before it is killed.
    #[arg(long, short = 't')]
    pub timeout: Option<u64>,

    /// Milliseconds to wait after the last keystroke before running.
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Shell used to interpret commands (run as `<shell> -c <command>`).
    #[arg(long)]
    pub shell: Option<String>,

    /// Write log output to this file instead of stderr.
    ///
    /// The level is taken from `RUST_LOG`, defaulting to `info` when a file is given.
    #[arg(long)]
    pub log_file: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SubCommand {
    /// Print the shell function that puts the final command on your prompt.
    ///
    /// Supported shells: zsh, bash.
    Init {
        /// Name of the shell.
        shell: Option<String>,
    },
}

use std::env;
use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info, LevelFilter};
use shui_core::config::{self, EngineConfig};
use shui_core::error::{Error, Result};
use shui_core::mirror::MirrorFile;
use shui_core::shell_init::Shell;

use shui_cli::cli_args::{Args, SubCommand};
use shui_cli::theme::Theme;
use shui_cli::tui;

fn init_logging(log_file: Option<&str>) -> Result<()> {
    let mut builder = env_logger::Builder::from_default_env();

    if let Some(path) = log_file {
        let file = File::create(config::expand_path(path))
            .map_err(|e| Error::io_error("log".to_string(), path.to_string(), e))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));

        if env::var_os("RUST_LOG").is_none() {
            builder.filter_level(LevelFilter::Info);
        }
    }

    builder.init();
    Ok(())
}

/// Reads all of stdin when something is piped in.
fn read_piped_stdin() -> Result<Option<Vec<u8>>> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut content = Vec::new();
    stdin.read_to_end(&mut content).map_err(Error::Stdio)?;
    debug!("Read {} bytes from stdin", content.len());
    Ok(Some(content))
}

/// The line handed back to the shell on exit. Nothing for an empty editor.
fn final_output(command: String) -> Option<String> {
    Some(command).filter(|command| !command.is_empty())
}

fn print_init_script(shell: Option<&str>) -> Result<()> {
    let shell: Shell = shell.ok_or(Error::MissingShell)?.parse()?;
    print!("{}", shell.init_script());
    Ok(())
}

/// Runs shui and returns the command to hand back to the shell, if any.
fn execute() -> Result<Option<String>> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    if let Some(SubCommand::Init { shell }) = &args.command {
        print_init_script(shell.as_deref())?;
        return Ok(None);
    }

    let config_path = config::get_config_path(&args.config_path);
    debug!("Config path: `{}`", config_path);
    let settings = config::load_settings(&config_path)?;
    let theme = Theme::from_settings(&settings.theme)?;
    let engine_config = EngineConfig::resolve(
        &settings,
        args.debounce_ms,
        args.timeout,
        args.shell.clone(),
    );
    info!(
        "Using shell `{}`, debounce {:?}, timeout {:?}",
        engine_config.shell, engine_config.debounce_delay, engine_config.timeout
    );

    let stdin = read_piped_stdin()?;
    let mirror = args
        .output_file
        .as_deref()
        .filter(|path| !path.is_empty())
        .map(|path| MirrorFile::new(config::expand_path(path)));

    let command = tui::run(engine_config, theme, stdin, mirror)?;

    Ok(final_output(command))
}

fn main() -> ExitCode {
    match execute() {
        Ok(Some(command)) => {
            println!("{command}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

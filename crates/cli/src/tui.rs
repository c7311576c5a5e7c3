//! The interactive event loop.
//!
//! Terminal input is read on its own thread and execution outcomes come from
//! executor threads; both land on one channel consumed here. Timer expiry is
//! handled by waiting on the channel only until the next debounce deadline.

use std::io::{stderr, Error as IoError};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;
use log::{debug, error};
use shui_core::config::EngineConfig;
use shui_core::error::{Error, Result};
use shui_core::execution::{ExecutionOutcome, Executor, ShellExecutor};
use shui_core::input::{AuxKey, InputMode};
use shui_core::mirror::MirrorFile;
use shui_core::reconciler::Reconciler;
use shui_core::session::Session;

use crate::keys::{self, Action};
use crate::panes::{Layout, OutputPane, StatusLine};
use crate::theme::Theme;
use crate::ui::{self, RawModeGuard, View};

/// How long to sleep when no timer is armed.
const IDLE_WAIT: Duration = Duration::from_millis(500);

pub enum AppEvent {
    Terminal(Event),
    TerminalClosed(IoError),
    Finished(ExecutionOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub type TerminalSession<X> = Session<X, OutputPane, StatusLine>;

fn spawn_terminal_reader(sender: Sender<AppEvent>) -> Result<()> {
    thread::Builder::new()
        .name("shui-terminal".to_string())
        .spawn(move || loop {
            let event = match event::read() {
                Ok(event) => AppEvent::Terminal(event),
                Err(e) => {
                    let _ = sender.send(AppEvent::TerminalClosed(e));
                    return;
                }
            };
            if sender.send(event).is_err() {
                return;
            }
        })?;
    Ok(())
}

/// Applies one terminal event to the session.
pub fn handle_event<X: Executor>(
    session: &mut TerminalSession<X>,
    layout: &mut Layout,
    event: Event,
    now: Instant,
) -> Flow {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            if session.input_mode() == InputMode::CapturingAuxiliaryField {
                session.capture_key(keys::aux_key(key));
                return Flow::Continue;
            }

            match keys::action_for_key(key) {
                Action::Quit => return Flow::Quit,
                Action::ClearCommand => session.clear_command(),
                Action::ClearOutput => session.clear_output(),
                Action::ToggleFreeze => {
                    let frozen = session.toggle_freeze();
                    debug!("Frozen: {}", frozen);
                }
                Action::EditOutputFile => session.begin_mirror_capture(),
                Action::ScrollUp => session.reconciler_mut().results_mut().page_up(),
                Action::ScrollDown => session.reconciler_mut().results_mut().page_down(),
                Action::Insert(c) => session.edit_command(now, |buffer| buffer.push(c)),
                Action::DeleteBack => session.edit_command(now, |buffer| {
                    buffer.pop();
                }),
                Action::Ignore => {}
            }
        }
        Event::Paste(text) => {
            if session.input_mode() == InputMode::CapturingAuxiliaryField {
                for c in text.chars() {
                    session.capture_key(AuxKey::Char(c));
                }
            } else {
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                session.edit_command(now, |buffer| buffer.push_str(&text));
            }
        }
        Event::Resize(width, height) => {
            *layout = Layout::from_size(width, height);
            session
                .reconciler_mut()
                .results_mut()
                .set_viewport_height(layout.output_rows());
        }
        _ => {}
    }

    Flow::Continue
}

fn draw_session<X: Executor>(
    session: &TerminalSession<X>,
    theme: &Theme,
    layout: &Layout,
) -> Result<()> {
    let reconciler = session.reconciler();
    let capturing = session.input_mode() == InputMode::CapturingAuxiliaryField;

    let view = View {
        command: session.command(),
        output: reconciler.results(),
        status: reconciler.status_sink(),
        frozen: reconciler.state().frozen,
        executing: reconciler.state().is_executing(),
        mirror: reconciler.mirror().map(ToString::to_string),
        capture: capturing.then(|| session.auxiliary_value()),
    };

    ui::draw(&mut stderr(), &view, theme, layout)
}

/// Runs the interactive session until the user quits and returns the
/// command left in the editor.
pub fn run(
    config: EngineConfig,
    theme: Theme,
    stdin: Option<Vec<u8>>,
    mirror: Option<MirrorFile>,
) -> Result<String> {
    let (sender, receiver) = mpsc::channel();
    let executor = ShellExecutor::new(config.shell.clone(), sender.clone(), AppEvent::Finished);
    let reconciler = Reconciler::new(
        executor,
        OutputPane::default(),
        StatusLine::default(),
        config.timeout,
    )
    .with_stdin(stdin)
    .with_mirror(mirror);
    let mut session = Session::new(reconciler, config.debounce_delay);

    let _raw_mode_guard = RawModeGuard::enter()?; // Restores the terminal when this goes out of scope

    let (width, height) = terminal::size()?;
    let mut layout = Layout::from_size(width, height);
    session
        .reconciler_mut()
        .results_mut()
        .set_viewport_height(layout.output_rows());

    spawn_terminal_reader(sender)?;
    session.start();

    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            draw_session(&session, &theme, &layout)?;
            needs_redraw = false;
        }

        let wait = session
            .next_deadline()
            .map(|due| due.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_WAIT);

        match receiver.recv_timeout(wait) {
            Ok(AppEvent::Terminal(event)) => {
                needs_redraw = true;
                if handle_event(&mut session, &mut layout, event, Instant::now()) == Flow::Quit {
                    break;
                }
            }
            Ok(AppEvent::Finished(outcome)) => {
                needs_redraw = true;
                session.apply_outcome(outcome);
            }
            Ok(AppEvent::TerminalClosed(e)) => {
                error!("Lost the terminal: {}", e);
                return Err(Error::Terminal(e));
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if session.fire_due(Instant::now()).is_some() {
            needs_redraw = true;
        }
    }

    Ok(session.into_command())
}

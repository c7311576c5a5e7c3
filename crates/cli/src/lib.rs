//! Shui CLI Library
//!
//! This crate provides the terminal front end for shui: argument parsing,
//! key bindings, the screen layout and the event loop that connects them to
//! the engine in `shui-core`.
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`keys`]: Key presses to actions
//! - [`panes`]: Output pane and status line state, screen layout
//! - [`theme`]: Colors from the settings file
//! - [`ui`]: Drawing with crossterm
//! - [`tui`]: The event loop
//!
//! # Examples
//!
//! ```bash
//! # Start with an empty editor
//! shui
//!
//! # Feed data in and keep a file in sync with the result
//! cat access.log | shui -o ~/filtered.log
//!
//! # Put the final command on the prompt (add to ~/.zshrc)
//! eval "$(shui init zsh)"
//! ```

pub mod cli_args;
pub mod keys;
pub mod panes;
pub mod theme;
pub mod tui;
pub mod ui;

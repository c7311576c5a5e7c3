//! Shell functions that put the command left in shui onto the prompt.
//!
//! `shui init <shell>` prints one of these; the user evaluates it from their
//! shell rc file.

use std::str::FromStr;

use crate::error::Error;

const ZSH_INIT: &str = r#"shui() {
  local cmd
  cmd=$(command shui "$@")
  if [[ -n "$cmd" ]]; then
    print -z "$cmd"
  fi
}
"#;

const BASH_INIT: &str = r#"shui() {
  local cmd
  cmd=$(command shui "$@")
  if [[ -n "$cmd" ]]; then
    history -s "$cmd"
    bind '"\e[0n": "'"$cmd"'"'
    printf '\e[5n'
  fi
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Zsh,
    Bash,
}

impl Shell {
    pub fn init_script(self) -> &'static str {
        match self {
            Shell::Zsh => ZSH_INIT,
            Shell::Bash => BASH_INIT,
        }
    }
}

impl FromStr for Shell {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "zsh" => Ok(Shell::Zsh),
            "bash" => Ok(Shell::Bash),
            other => Err(Error::UnsupportedShell(other.to_string())),
        }
    }
}

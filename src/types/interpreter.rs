//! Interpreter presets
//!
//! An interpreter is just the command line handed to `/bin/sh -c`. The presets
//! cover the backends the crate knows how to handshake with; anything else goes
//! through [`Interpreter::Custom`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScriptError};
use crate::handshake::{Handshake, NoHandshake, PythonHandshake, RubyHandshake};

#[cfg(not(feature = "echo"))]
const GNUPLOT_CMD: &str = "gnuplot";
#[cfg(feature = "echo")]
const GNUPLOT_CMD: &str = "cat";

#[cfg(not(feature = "echo"))]
const PYTHON_CMD: &str = "python3";
#[cfg(feature = "echo")]
const PYTHON_CMD: &str = "cat";

/// External program driven through the command stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpreter {
    /// Swallow everything (`cat > /dev/null`)
    Null,
    /// Echo the command stream to stdout
    #[default]
    Cat,
    /// gnuplot, reading its script from stdin
    Gnuplot,
    /// Python 3 interpreter reading the script from stdin
    Python,
    /// Ruby interpreter reading the script from stdin
    Ruby,
    /// POSIX shell
    Shell,
    /// Any other command line
    Custom(String),
}

impl Interpreter {
    /// Command line passed to `/bin/sh -c`
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Null => "cat > /dev/null",
            Self::Cat => "cat",
            Self::Gnuplot => GNUPLOT_CMD,
            Self::Python => PYTHON_CMD,
            Self::Ruby => "ruby",
            Self::Shell => "sh",
            Self::Custom(cmd) => cmd,
        }
    }

    /// First word of the command line, i.e. the program the shell will exec
    #[must_use]
    pub fn program(&self) -> &str {
        self.command().split_whitespace().next().unwrap_or_default()
    }

    /// Find the interpreter's executable on `PATH`
    ///
    /// Spawning does not require this; it is a way to check availability up
    /// front, since `/bin/sh -c` only reports a missing program through the
    /// child's exit status.
    ///
    /// # Errors
    /// Returns [`ScriptError::CommandNotFound`] if the program is not on `PATH`
    pub fn locate(&self) -> Result<PathBuf> {
        let program = self.program();
        if program.is_empty() {
            return Err(ScriptError::command_not_found("<empty command>"));
        }
        which::which(program).map_err(|e| ScriptError::command_not_found(format!("{program}: {e}")))
    }

    /// Handshake text generator matching this interpreter
    #[must_use]
    pub fn handshake(&self) -> Box<dyn Handshake> {
        match self {
            // With the echo feature these run `cat`, but the handshake text is
            // still what the real backend would have received.
            Self::Python => Box::new(PythonHandshake::default()),
            Self::Ruby => Box::new(RubyHandshake::default()),
            Self::Null | Self::Cat | Self::Gnuplot | Self::Shell | Self::Custom(_) => {
                Box::new(NoHandshake)
            }
        }
    }
}

impl From<&str> for Interpreter {
    fn from(cmd: &str) -> Self {
        Self::Custom(cmd.to_string())
    }
}

impl From<String> for Interpreter {
    fn from(cmd: String) -> Self {
        Self::Custom(cmd)
    }
}

impl std::fmt::Display for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}

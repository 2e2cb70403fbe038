//! Process options and configuration
//!
//! This module contains the construction parameters for a
//! [`SubprocessChannel`](crate::SubprocessChannel), including a builder pattern
//! and JSON loading for hosts that keep them in a config file.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;

use serde::{Deserialize, Serialize};

use super::interpreter::Interpreter;
use crate::error::{Result, ScriptError};
use crate::process::MAX_CHANNELS;

// ============================================================================
// Output disposition
// ============================================================================

/// What happens to the child's stdout or stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Share the parent's stream
    #[default]
    Inherit,
    /// Discard
    Null,
    /// Capture through a pipe, see `SubprocessChannel::take_stdout`
    ///
    /// The caller must drain it; a child blocked on a full stdout pipe never
    /// exits, and teardown waits for it.
    Piped,
}

impl OutputMode {
    pub(crate) fn to_stdio(self) -> Stdio {
        match self {
            Self::Inherit => Stdio::inherit(),
            Self::Null => Stdio::null(),
            Self::Piped => Stdio::piped(),
        }
    }
}

// ============================================================================
// Process Options
// ============================================================================

/// Construction parameters for a `SubprocessChannel`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    /// Program driven through the command stream
    pub interpreter: Interpreter,
    /// Number of auxiliary data channels (must be below `MAX_CHANNELS`)
    pub channels: usize,
    /// Child stdout disposition
    pub stdout: OutputMode,
    /// Child stderr disposition
    pub stderr: OutputMode,
    /// Also let the child inherit the channels' write ends
    ///
    /// Off by default: the child then sees EOF on a channel as soon as the
    /// parent closes it. When on, the child must close its copies first (the
    /// handshake does this).
    pub inherit_write_ends: bool,
    /// Working directory for the child
    pub cwd: Option<PathBuf>,
    /// Extra environment variables for the child
    pub env: BTreeMap<String, String>,
    /// Panic when a write end fails to close at teardown
    pub strict_close: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            interpreter: Interpreter::default(),
            channels: 1,
            stdout: OutputMode::default(),
            stderr: OutputMode::default(),
            inherit_write_ends: false,
            cwd: None,
            env: BTreeMap::new(),
            strict_close: false,
        }
    }
}

impl ProcessOptions {
    /// Options for `interpreter` with `channels` data channels, everything else default
    pub fn new(interpreter: impl Into<Interpreter>, channels: usize) -> Self {
        Self {
            interpreter: interpreter.into(),
            channels,
            ..Self::default()
        }
    }

    /// Create a new builder for `ProcessOptions`
    #[must_use]
    pub fn builder() -> ProcessOptionsBuilder {
        ProcessOptionsBuilder::default()
    }

    /// Load options from a JSON document; missing fields take their defaults
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or the options fail validation
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Serialize to a JSON document
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the preconditions of process construction
    ///
    /// # Errors
    /// Returns [`ScriptError::InvalidConfig`] if the channel count is out of bounds
    /// or the command line is empty
    pub fn validate(&self) -> Result<()> {
        if self.channels >= MAX_CHANNELS {
            return Err(ScriptError::invalid_config(format!(
                "channel count {} exceeds maximum allowed: {}",
                self.channels,
                MAX_CHANNELS - 1
            )));
        }
        if self.interpreter.command().trim().is_empty() {
            return Err(ScriptError::invalid_config("empty command line"));
        }
        Ok(())
    }
}

// ============================================================================
// Builder for ProcessOptions
// ============================================================================

/// Builder for `ProcessOptions`
#[derive(Debug, Default)]
pub struct ProcessOptionsBuilder {
    options: ProcessOptions,
}

impl ProcessOptionsBuilder {
    /// Set the interpreter
    #[must_use]
    pub fn interpreter(mut self, interpreter: impl Into<Interpreter>) -> Self {
        self.options.interpreter = interpreter.into();
        self
    }

    /// Set a custom command line
    #[must_use]
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.options.interpreter = Interpreter::Custom(command.into());
        self
    }

    /// Set the number of data channels
    #[must_use]
    pub const fn channels(mut self, channels: usize) -> Self {
        self.options.channels = channels;
        self
    }

    /// Set the child's stdout disposition
    #[must_use]
    pub const fn stdout(mut self, mode: OutputMode) -> Self {
        self.options.stdout = mode;
        self
    }

    /// Set the child's stderr disposition
    #[must_use]
    pub const fn stderr(mut self, mode: OutputMode) -> Self {
        self.options.stderr = mode;
        self
    }

    /// Let the child inherit the channels' write ends too
    #[must_use]
    pub const fn inherit_write_ends(mut self, inherit: bool) -> Self {
        self.options.inherit_write_ends = inherit;
        self
    }

    /// Set working directory
    #[must_use]
    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.cwd = Some(path.into());
        self
    }

    /// Add an environment variable for the child
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.env.insert(key.into(), value.into());
        self
    }

    /// Panic on write-end close failures at teardown
    #[must_use]
    pub const fn strict_close(mut self, strict: bool) -> Self {
        self.options.strict_close = strict;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> ProcessOptions {
        self.options
    }
}

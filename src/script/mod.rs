//! Stateless script sessions
//!
//! A [`Script`] keeps a process ready and, on every [`call`](Script::call),
//! sends the handshake for that process, replays the persistent header, lets
//! the caller write the body, then tears the process down and spawns a fresh
//! one. Ending the command stream is what makes interpreters such as Python
//! actually run the script, and respawning keeps one call's channels and
//! half-written commands from leaking into the next.

mod call;

pub use call::Call;

use crate::error::{Result, ScriptError};
use crate::handshake::Handshake;
use crate::process::{SubprocessChannel, TeardownReport};
use crate::types::options::ProcessOptions;

/// Respawning driver around [`SubprocessChannel`]
#[derive(Debug)]
pub struct Script {
    options: ProcessOptions,
    handshake: Box<dyn Handshake>,
    header: String,
    process: Option<SubprocessChannel>,
    calls: usize,
    last_report: Option<TeardownReport>,
}

impl Script {
    /// Spawn the first process, using the interpreter's own handshake
    ///
    /// # Errors
    /// Returns error if the options are invalid or the process cannot be spawned
    pub fn new(options: ProcessOptions) -> Result<Self> {
        let handshake = options.interpreter.handshake();
        Self::with_boxed_handshake(options, handshake)
    }

    /// Spawn the first process with a custom handshake
    ///
    /// # Errors
    /// Returns error if the options are invalid or the process cannot be spawned
    pub fn with_handshake(options: ProcessOptions, handshake: impl Handshake + 'static) -> Result<Self> {
        Self::with_boxed_handshake(options, Box::new(handshake))
    }

    fn with_boxed_handshake(options: ProcessOptions, handshake: Box<dyn Handshake>) -> Result<Self> {
        let process = SubprocessChannel::new(options.clone())?;
        Ok(Self {
            options,
            handshake,
            header: String::new(),
            process: Some(process),
            calls: 0,
            last_report: None,
        })
    }

    /// Append text to the header replayed at the start of every call
    pub fn add_to_header(&mut self, text: impl AsRef<str>) {
        self.header.push_str(text.as_ref());
    }

    /// The persistent header
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Drop the persistent header
    pub fn clear_header(&mut self) {
        self.header.clear();
    }

    /// Options every process of this script is spawned with
    #[must_use]
    pub const fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Number of calls completed so far
    #[must_use]
    pub const fn calls(&self) -> usize {
        self.calls
    }

    /// The idle process waiting for the next call
    #[must_use]
    pub const fn process(&self) -> Option<&SubprocessChannel> {
        self.process.as_ref()
    }

    /// Teardown report of the most recent call's process
    #[must_use]
    pub const fn last_report(&self) -> Option<&TeardownReport> {
        self.last_report.as_ref()
    }

    /// Run one stateless call
    ///
    /// The handshake and header are sent before `body` runs. Whatever `body`
    /// returns, the process is then closed and replaced by a fresh one; the
    /// body's error takes precedence over a respawn error.
    ///
    /// # Errors
    /// Returns [`ScriptError::ProcessGone`] if an earlier respawn failed, the
    /// body's error, or a [`ScriptError::Resource`] error from the respawn
    pub fn call<T, F>(&mut self, body: F) -> Result<T>
    where
        F: FnOnce(&mut Call<'_>) -> Result<T>,
    {
        let mut process = self.process.take().ok_or(ScriptError::ProcessGone)?;
        let index = self.calls;

        let outcome = self.run_body(&mut process, index, body);

        let report = process.close();
        log::debug!(
            "call {index} finished (exit status {:?}, {} warning(s))",
            report.exit_status,
            report.warnings.len()
        );
        self.last_report = Some(report);
        self.calls += 1;

        let respawned = SubprocessChannel::new(self.options.clone());
        match (outcome, respawned) {
            (Ok(value), Ok(next)) => {
                self.process = Some(next);
                Ok(value)
            }
            (Err(e), Ok(next)) => {
                self.process = Some(next);
                Err(e)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Err(respawn_err)) => {
                log::warn!("respawn after failed call {index} also failed: {respawn_err}");
                Err(e)
            }
        }
    }

    fn run_body<T, F>(&self, process: &mut SubprocessChannel, index: usize, body: F) -> Result<T>
    where
        F: FnOnce(&mut Call<'_>) -> Result<T>,
    {
        self.handshake.send(process)?;
        process.send(&self.header)?;

        let mut call = Call::new(process, index);
        body(&mut call)
    }

    /// Close the idle process and end the script
    #[must_use = "the report is the only place the exit status surfaces besides the log"]
    pub fn finish(mut self) -> Option<TeardownReport> {
        self.process.take().map(SubprocessChannel::close)
    }
}

//! Lifecycle management for the subprocess (spawn, teardown)

use std::os::fd::{AsRawFd, RawFd};
use std::process::ExitStatus;

use crate::error::{Result, ScriptError};
use crate::types::identifiers::InstanceId;
use crate::types::options::ProcessOptions;

use super::command::CommandBuilder;
use super::pipe::{close_checked, pipe_cloexec};
use super::sink::{CommandStream, DataSink};
use super::subprocess::{Channel, SubprocessChannel};

/// Which descriptor a close warning is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseTarget {
    /// Write end of a data channel
    ChannelWrite(usize),
    /// The child's stdin
    Stdin,
}

/// A flush or close that failed during teardown; logged, never raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseWarning {
    /// Descriptor the failure concerns
    pub target: CloseTarget,
    /// Descriptor number
    pub fd: RawFd,
    /// OS error text
    pub message: String,
}

/// What teardown observed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Exit status of the child, if it could be waited on
    pub exit_status: Option<ExitStatus>,
    /// Flush/close failures, in the order they happened
    pub warnings: Vec<CloseWarning>,
}

impl TeardownReport {
    /// No warnings and a successful exit
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.exit_status.is_some_and(|status| status.success())
    }
}

impl SubprocessChannel {
    /// Create the data pipes, spawn the interpreter and close the read ends locally
    ///
    /// # Errors
    /// Returns error if the options are invalid or a pipe or the process cannot
    /// be created. Descriptors created before the failure are released.
    pub(super) fn spawn_impl(options: &ProcessOptions) -> Result<Self> {
        options.validate()?;

        let id = InstanceId::new();
        let count = options.channels;

        // Open data pipes and wrap their write ends
        let mut read_ends = Vec::with_capacity(count);
        let mut sinks = Vec::with_capacity(count);
        for index in 0..count {
            let pipe = pipe_cloexec().map_err(|e| {
                ScriptError::resource(format!("pipe() for channel {index} failed"), e)
            })?;
            read_ends.push(pipe.read);
            sinks.push(DataSink::new(index, pipe.write));
        }

        let mut inherited: Vec<RawFd> = read_ends.iter().map(AsRawFd::as_raw_fd).collect();
        if options.inherit_write_ends {
            inherited.extend(sinks.iter().map(DataSink::fd));
        }

        // Spawn process
        let mut child = CommandBuilder::new(options, &inherited)
            .build()
            .spawn()
            .map_err(|e| {
                ScriptError::resource(format!("failed to start `{}`", options.interpreter), e)
            })?;

        let Some(stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ScriptError::resource(
                "failed to get stdin handle",
                std::io::Error::other("stdin was not piped"),
            ));
        };

        log::debug!(
            "[{id}] spawned `{}` (pid {}) with {count} channel(s)",
            options.interpreter,
            child.id()
        );

        // Close unused read ends on this process
        let mut channels = Vec::with_capacity(count);
        for (index, (read_end, sink)) in read_ends.into_iter().zip(sinks).enumerate() {
            let (read_fd, closed) = close_checked(read_end);
            if let Err(e) = closed {
                log::warn!(
                    "[{id}] error closing (read) file descriptor {read_fd} on channel {index}: {e}"
                );
            }
            log::debug!(
                "[{id}] channel {index} opened with read end {read_fd} and write end {}",
                sink.fd()
            );
            channels.push(Channel { read_fd, sink });
        }

        Ok(Self {
            id,
            interpreter: options.interpreter.clone(),
            channels,
            stdin: CommandStream::new(stdin),
            child: Some(child),
            inherit_write_ends: options.inherit_write_ends,
            strict_close: options.strict_close,
        })
    }

    /// Close every write end, then stdin, then wait for the child
    ///
    /// Runs to completion whatever fails along the way. Calling it again is a
    /// no-op that returns an empty report.
    pub(super) fn teardown_impl(&mut self) -> TeardownReport {
        let id = self.id;
        let mut report = TeardownReport::default();
        let mut failed_write_closes = 0usize;

        // Close 'data' pipes
        for (index, channel) in std::mem::take(&mut self.channels).into_iter().enumerate() {
            let target = CloseTarget::ChannelWrite(index);
            let (file, flushed) = channel.sink.into_file();
            if let Err(e) = flushed {
                log::warn!("[{id}] error flushing channel {index}: {e}");
                report.warnings.push(CloseWarning {
                    target,
                    fd: file.as_raw_fd(),
                    message: e.to_string(),
                });
            }

            let (fd, closed) = close_checked(file);
            if let Err(e) = closed {
                log::warn!("[{id}] error closing (write) file descriptor {fd} on channel {index}: {e}");
                report.warnings.push(CloseWarning {
                    target,
                    fd,
                    message: e.to_string(),
                });
                failed_write_closes += 1;
            }
        }

        // Closing stdin ends the script; interpreters like python start running here
        if let Some((stdin, flushed)) = self.stdin.take() {
            if let Err(e) = flushed {
                log::warn!("[{id}] error flushing command stream: {e}");
                report.warnings.push(CloseWarning {
                    target: CloseTarget::Stdin,
                    fd: stdin.as_raw_fd(),
                    message: e.to_string(),
                });
            }
            let (fd, closed) = close_checked(stdin);
            if let Err(e) = closed {
                log::warn!("[{id}] error closing command stream (fd {fd}): {e}");
                report.warnings.push(CloseWarning {
                    target: CloseTarget::Stdin,
                    fd,
                    message: e.to_string(),
                });
            }
        }

        if let Some(mut child) = self.child.take() {
            // Unread output pipes would keep a chatty child blocked forever
            drop(child.stdout.take());
            drop(child.stderr.take());

            match child.wait() {
                Ok(status) if status.success() => {
                    log::info!("[{id}] `{}` exited: {status}", self.interpreter);
                    report.exit_status = Some(status);
                }
                Ok(status) => {
                    log::warn!("[{id}] `{}` exited: {status}", self.interpreter);
                    report.exit_status = Some(status);
                }
                Err(e) => {
                    log::warn!("[{id}] failed to wait for `{}`: {e}", self.interpreter);
                }
            }
        }

        if self.strict_close && failed_write_closes > 0 {
            // A second panic while unwinding would abort the whole process
            if std::thread::panicking() {
                log::error!(
                    "[{id}] {failed_write_closes} channel write end(s) failed to close during unwind"
                );
            } else {
                panic!("[{id}] {failed_write_closes} channel write end(s) failed to close");
            }
        }

        report
    }
}

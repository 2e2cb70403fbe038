//! The spawned interpreter together with its data channels

use std::io::{self, Write};
use std::os::fd::RawFd;
use std::process::{Child, ChildStderr, ChildStdout};

use crate::error::{Result, ScriptError};
use crate::types::identifiers::InstanceId;
use crate::types::interpreter::Interpreter;
use crate::types::options::ProcessOptions;

use super::lifecycle::TeardownReport;
use super::sink::{CommandStream, DataSink};

/// One auxiliary pipe
#[derive(Debug)]
pub(super) struct Channel {
    /// Read-end number; closed here, open in the child
    pub(super) read_fd: RawFd,
    pub(super) sink: DataSink,
}

/// Descriptor numbers of one channel, for embedding in handshake text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelFds {
    /// Channel index
    pub index: usize,
    /// Read end, open only in the child
    pub read_fd: RawFd,
    /// Write end, held by the parent
    pub write_fd: RawFd,
}

/// An external interpreter plus N auxiliary data channels
///
/// The child reads its script from the command stream ([`out`](Self::out) or
/// the `Write` impl on this type) and, when told to by that script, opens the
/// inherited read ends whose numbers [`read_fd`](Self::read_fd) reports.
///
/// Dropping the value closes every write end, then stdin, then waits for the
/// child. Writes block when a pipe is full and the child is not reading it;
/// making the child drain channels in an order that matches the writes is up
/// to the caller.
#[derive(Debug)]
pub struct SubprocessChannel {
    pub(super) id: InstanceId,
    pub(super) interpreter: Interpreter,
    pub(super) channels: Vec<Channel>,
    pub(super) stdin: CommandStream,
    pub(super) child: Option<Child>,
    pub(super) inherit_write_ends: bool,
    pub(super) strict_close: bool,
}

impl SubprocessChannel {
    /// Spawn a process from full options
    ///
    /// # Errors
    /// Returns [`ScriptError::InvalidConfig`] if the options are invalid and
    /// [`ScriptError::Resource`] if a pipe or the process cannot be created
    pub fn new(options: ProcessOptions) -> Result<Self> {
        Self::spawn_impl(&options)
    }

    /// Spawn `command` with `channel_count` data channels and default options
    ///
    /// # Errors
    /// See [`new`](Self::new)
    pub fn create(command: impl Into<Interpreter>, channel_count: usize) -> Result<Self> {
        Self::new(ProcessOptions::new(command, channel_count))
    }

    /// Tag used in this instance's log lines
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Interpreter this process runs
    #[must_use]
    pub const fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// OS process id of the child
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// The command stream (child stdin)
    pub fn out(&mut self) -> &mut CommandStream {
        &mut self.stdin
    }

    /// Append text to the command stream
    ///
    /// For formatted output use `write!` on the process or on [`out`](Self::out).
    ///
    /// # Errors
    /// Returns error if the write fails
    pub fn send(&mut self, text: &str) -> Result<()> {
        self.stdin.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Flush the command stream and every channel
    ///
    /// # Errors
    /// Returns the first flush error; the remaining sinks are still flushed
    pub fn flush_all(&mut self) -> Result<()> {
        let mut first_err = self.stdin.flush().err();
        for channel in &mut self.channels {
            if let Err(e) = channel.sink.flush() {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Sink for a channel's write end
    ///
    /// # Errors
    /// Returns [`ScriptError::ChannelIndex`] if `index >= channel_count()`
    pub fn data_out(&mut self, index: usize) -> Result<&mut DataSink> {
        let count = self.channels.len();
        self.channels
            .get_mut(index)
            .map(|channel| &mut channel.sink)
            .ok_or(ScriptError::channel_index(index, count))
    }

    /// Number of data channels
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Read-end descriptor number of a channel (open in the child only)
    ///
    /// # Errors
    /// Returns [`ScriptError::ChannelIndex`] if `index >= channel_count()`
    pub fn read_fd(&self, index: usize) -> Result<RawFd> {
        self.channel(index).map(|channel| channel.read_fd)
    }

    /// Write-end descriptor number of a channel
    ///
    /// # Errors
    /// Returns [`ScriptError::ChannelIndex`] if `index >= channel_count()`
    pub fn write_fd(&self, index: usize) -> Result<RawFd> {
        self.channel(index).map(|channel| channel.sink.fd())
    }

    /// Descriptor numbers of every channel, in index order
    pub fn channels(&self) -> impl Iterator<Item = ChannelFds> + '_ {
        self.channels.iter().enumerate().map(|(index, channel)| ChannelFds {
            index,
            read_fd: channel.read_fd,
            write_fd: channel.sink.fd(),
        })
    }

    /// Whether the child also holds the channels' write ends
    #[must_use]
    pub const fn write_ends_inherited(&self) -> bool {
        self.inherit_write_ends
    }

    /// Take the child's stdout, if it was spawned with `OutputMode::Piped`
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.as_mut().and_then(|child| child.stdout.take())
    }

    /// Take the child's stderr, if it was spawned with `OutputMode::Piped`
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.as_mut().and_then(|child| child.stderr.take())
    }

    /// Close everything and wait for the child
    ///
    /// Same teardown as dropping the value, but hands back what happened.
    #[must_use = "the report is the only place the exit status surfaces besides the log"]
    pub fn close(mut self) -> TeardownReport {
        self.teardown_impl()
    }

    fn channel(&self, index: usize) -> Result<&Channel> {
        self.channels
            .get(index)
            .ok_or(ScriptError::channel_index(index, self.channels.len()))
    }
}

impl Write for SubprocessChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdin.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stdin.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdin.flush()
    }
}

impl Drop for SubprocessChannel {
    fn drop(&mut self) {
        let _report = self.teardown_impl();
    }
}

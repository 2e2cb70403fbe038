//! Per-call view of a script's process

use std::io::{self, Write};
use std::os::fd::RawFd;

use crate::error::Result;
use crate::process::{CommandStream, DataSink, SubprocessChannel};

/// One logical call on a [`Script`](super::Script)
///
/// Lives only for the duration of the call. The plot counter starts at zero
/// for every call, so numbering never carries over between calls.
#[derive(Debug)]
pub struct Call<'a> {
    process: &'a mut SubprocessChannel,
    index: usize,
    plots: usize,
}

impl<'a> Call<'a> {
    pub(super) fn new(process: &'a mut SubprocessChannel, index: usize) -> Self {
        Self {
            process,
            index,
            plots: 0,
        }
    }

    /// Zero-based number of this call within its script
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Hand out the next plot number of this call (0, 1, 2, ...)
    pub fn next_plot(&mut self) -> usize {
        let plot = self.plots;
        self.plots += 1;
        plot
    }

    /// How many plot numbers this call has handed out
    #[must_use]
    pub const fn plots(&self) -> usize {
        self.plots
    }

    /// The underlying process
    pub fn process(&mut self) -> &mut SubprocessChannel {
        &mut *self.process
    }

    /// The command stream
    pub fn out(&mut self) -> &mut CommandStream {
        self.process.out()
    }

    /// Append text to the command stream
    ///
    /// # Errors
    /// Returns error if the write fails
    pub fn send(&mut self, text: &str) -> Result<()> {
        self.process.send(text)
    }

    /// Sink for a channel's write end
    ///
    /// # Errors
    /// Returns [`ScriptError::ChannelIndex`](crate::ScriptError::ChannelIndex) for a bad index
    pub fn data_out(&mut self, index: usize) -> Result<&mut DataSink> {
        self.process.data_out(index)
    }

    /// Read-end descriptor number of a channel
    ///
    /// # Errors
    /// Returns [`ScriptError::ChannelIndex`](crate::ScriptError::ChannelIndex) for a bad index
    pub fn read_fd(&self, index: usize) -> Result<RawFd> {
        self.process.read_fd(index)
    }

    /// Write-end descriptor number of a channel
    ///
    /// # Errors
    /// Returns [`ScriptError::ChannelIndex`](crate::ScriptError::ChannelIndex) for a bad index
    pub fn write_fd(&self, index: usize) -> Result<RawFd> {
        self.process.write_fd(index)
    }
}

impl Write for Call<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.process.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.process.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.process.flush()
    }
}

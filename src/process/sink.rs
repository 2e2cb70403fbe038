//! Write-side adapters: the command stream and the per-channel data sinks
//!
//! Both implement [`std::io::Write`], so `write!`/`writeln!` with the usual
//! width and precision formatting work on them.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::process::ChildStdin;

/// Text sink over the child's stdin
///
/// Buffered; everything written is flushed by [`flush`](Write::flush) or at
/// teardown at the latest.
#[derive(Debug)]
pub struct CommandStream {
    inner: Option<BufWriter<ChildStdin>>,
}

impl CommandStream {
    pub(super) fn new(stdin: ChildStdin) -> Self {
        Self {
            inner: Some(BufWriter::new(stdin)),
        }
    }

    /// Descriptor of the child's stdin, if the stream is still open
    #[must_use]
    pub fn fd(&self) -> Option<RawFd> {
        self.inner.as_ref().map(|w| w.get_ref().as_raw_fd())
    }

    /// Flush and hand back the raw stdin handle; `None` once already closed
    pub(super) fn take(&mut self) -> Option<(ChildStdin, io::Result<()>)> {
        let mut writer = self.inner.take()?;
        let flushed = writer.flush();
        let (stdin, _unflushed) = writer.into_parts();
        Some((stdin, flushed))
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<ChildStdin>> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "command stream closed"))
    }
}

impl Write for CommandStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.writer()?.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

/// Byte sink over one channel's write end
///
/// The sink lives as long as its process; repeated lookups of the same
/// channel return this same sink, so partially written rows stay buffered
/// across calls.
#[derive(Debug)]
pub struct DataSink {
    index: usize,
    fd: RawFd,
    inner: BufWriter<File>,
}

impl DataSink {
    pub(super) fn new(index: usize, write_end: OwnedFd) -> Self {
        let fd = write_end.as_raw_fd();
        Self {
            index,
            fd,
            inner: BufWriter::new(File::from(write_end)),
        }
    }

    /// Channel index this sink writes to
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Write-end descriptor number
    #[must_use]
    pub const fn fd(&self) -> RawFd {
        self.fd
    }

    /// Write one whitespace-delimited row terminated by a newline
    ///
    /// # Errors
    /// Returns error if the write fails (e.g. the reader has gone away)
    pub fn write_row<I>(&mut self, row: I) -> io::Result<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let mut first = true;
        for value in row {
            if first {
                first = false;
            } else {
                self.inner.write_all(b" ")?;
            }
            write!(self.inner, "{value}")?;
        }
        self.inner.write_all(b"\n")
    }

    /// Write several rows, one line each
    ///
    /// # Errors
    /// Returns error if any write fails
    pub fn write_rows<R, I>(&mut self, rows: R) -> io::Result<()>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator,
        I::Item: Display,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Flush and hand back the write end
    pub(super) fn into_file(mut self) -> (File, io::Result<()>) {
        let flushed = self.inner.flush();
        let (file, _unflushed) = self.inner.into_parts();
        (file, flushed)
    }
}

impl Write for DataSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.inner.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

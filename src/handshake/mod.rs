//! Channel handshake text
//!
//! A script interpreter does not know about the inherited channel read ends
//! until its script tells it. The handshake is the first block of the command
//! stream: it closes the write ends the child inherited (if any) and opens each
//! read end by its descriptor number. It must go out before the child is
//! expected to consume channel data, and each read end is opened exactly once.
//!
//! gnuplot and shells take their data inline or through `/dev/fd/N` paths and
//! need no handshake.

use crate::error::Result;
use crate::process::{ChannelFds, SubprocessChannel};

/// Name of the list the generated handshakes store channel readers in
pub const DEFAULT_READER_LIST: &str = "iosc_in";

/// Generates the handshake for one interpreter family
pub trait Handshake: std::fmt::Debug + Send + Sync {
    /// Render the handshake for the given channels
    ///
    /// `close_write_ends` is set when the child inherited the write ends and
    /// must drop them to ever see EOF on a channel.
    fn render(&self, channels: &[ChannelFds], close_write_ends: bool) -> String;

    /// Render for `process` and write the text to its command stream
    ///
    /// # Errors
    /// Returns error if writing to the command stream fails
    fn send(&self, process: &mut SubprocessChannel) -> Result<()> {
        let channels: Vec<ChannelFds> = process.channels().collect();
        let text = self.render(&channels, process.write_ends_inherited());
        if text.is_empty() {
            return Ok(());
        }
        log::debug!(
            "[{}] sending handshake for {} channel(s)",
            process.id(),
            channels.len()
        );
        process.send(&text)
    }
}

/// For interpreters that need nothing (gnuplot, shells, `cat`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoHandshake;

impl Handshake for NoHandshake {
    fn render(&self, _channels: &[ChannelFds], _close_write_ends: bool) -> String {
        String::new()
    }
}

/// Python: `os.fdopen` each read end into a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonHandshake {
    reader_list: String,
}

impl PythonHandshake {
    /// Store readers in a list with a different name
    pub fn with_reader_list(name: impl Into<String>) -> Self {
        Self {
            reader_list: name.into(),
        }
    }

    /// Name of the reader list in the generated script
    #[must_use]
    pub fn reader_list(&self) -> &str {
        &self.reader_list
    }
}

impl Default for PythonHandshake {
    fn default() -> Self {
        Self::with_reader_list(DEFAULT_READER_LIST)
    }
}

impl Handshake for PythonHandshake {
    fn render(&self, channels: &[ChannelFds], close_write_ends: bool) -> String {
        let list = &self.reader_list;
        let mut text = format!("# channel handshake\nimport os\n{list} = list()\n\n");
        for channel in channels {
            if close_write_ends {
                text.push_str(&format!("os.close({})\n", channel.write_fd));
            }
            text.push_str(&format!(
                "{list}.append(os.fdopen({}, 'r'))\n\n",
                channel.read_fd
            ));
        }
        text
    }
}

/// Ruby: `IO.new` each read end into an array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubyHandshake {
    reader_list: String,
}

impl RubyHandshake {
    /// Store readers in an array with a different name
    pub fn with_reader_list(name: impl Into<String>) -> Self {
        Self {
            reader_list: name.into(),
        }
    }
}

impl Default for RubyHandshake {
    fn default() -> Self {
        Self::with_reader_list(DEFAULT_READER_LIST)
    }
}

impl Handshake for RubyHandshake {
    fn render(&self, channels: &[ChannelFds], close_write_ends: bool) -> String {
        let list = &self.reader_list;
        let mut text = format!("# channel handshake\n{list} = []\n");
        for channel in channels {
            if close_write_ends {
                text.push_str(&format!("IO.new({}, \"w\").close\n", channel.write_fd));
            }
            text.push_str(&format!("{list} << IO.new({}, \"r\")\n", channel.read_fd));
        }
        text.push('\n');
        text
    }
}

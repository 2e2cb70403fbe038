//! Subprocess with auxiliary data channels
//!
//! This module spawns an interpreter through `/bin/sh -c`, hands it the read
//! ends of N freshly created pipes by descriptor inheritance, and keeps the
//! write ends as [`DataSink`]s next to a [`CommandStream`] over the child's
//! stdin.

mod command;
mod config;
mod lifecycle;
mod pipe;
mod sink;
mod subprocess;

// Re-export public types
pub use config::{MAX_CHANNELS, SHELL};
pub use lifecycle::{CloseTarget, CloseWarning, TeardownReport};
pub use sink::{CommandStream, DataSink};
pub use subprocess::{ChannelFds, SubprocessChannel};

//! # ioscript
//!
//! Drive an external interpreter (gnuplot, Python, Ruby, a shell, ...) through
//! its stdin while streaming raw data to it over auxiliary pipes.
//!
//! ## Quick Start
//!
//! A [`SubprocessChannel`] owns one spawned process and N data channels. The
//! channels' read ends are inherited by the child; their numbers are written
//! into the script so the child knows what to open:
//!
//! ```no_run
//! use std::io::Write;
//! use ioscript::{Handshake, Interpreter, PythonHandshake, SubprocessChannel};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut python = SubprocessChannel::create(Interpreter::Python, 1)?;
//!
//!     PythonHandshake::default().send(&mut python)?;
//!     writeln!(python, "for line in iosc_in[0]:")?;
//!     writeln!(python, "    print('vals:', [int(v) for v in line.split()])")?;
//!
//!     python.data_out(0)?.write_rows([[22, 67, 14, 42], [44, 47, 42, 19]])?;
//!
//!     // Closing ends the script; python runs it and reads the channel to EOF
//!     let report = python.close();
//!     log::info!("python exited with {:?}", report.exit_status);
//!     Ok(())
//! }
//! ```
//!
//! ## Stateless calls with [`Script`]
//!
//! [`Script`] sends the handshake, replays a persistent header, and respawns
//! the process after every call:
//!
//! ```no_run
//! # use ioscript::{Interpreter, ProcessOptions, Script};
//! # fn example() -> ioscript::Result<()> {
//! let mut gnuplot = Script::new(ProcessOptions::new(Interpreter::Gnuplot, 0))?;
//! gnuplot.add_to_header("set terminal dumb\n");
//!
//! gnuplot.call(|call| call.send("plot sin(x)\n"))?;
//! gnuplot.call(|call| call.send("plot cos(x)\n"))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Hazards
//!
//! Everything is synchronous. A write blocks while the target pipe is full and
//! the child is not reading it, and teardown waits for the child without a
//! timeout. The order in which the child drains its channels has to match the
//! order in which the parent fills them.

pub mod error;
pub mod handshake;
pub mod process;
pub mod script;
pub mod types;

// Re-export main types
pub use error::{Result, ScriptError};
pub use handshake::{Handshake, NoHandshake, PythonHandshake, RubyHandshake};
pub use process::{
    ChannelFds, CloseTarget, CloseWarning, CommandStream, DataSink, MAX_CHANNELS,
    SubprocessChannel, TeardownReport,
};
pub use script::{Call, Script};
pub use types::{InstanceId, Interpreter, OutputMode, ProcessOptions, ProcessOptionsBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Type definitions for ioscript
//!
//! - [`identifiers`] - Type-safe ID wrappers (`InstanceId`)
//! - [`interpreter`] - Interpreter presets and their command lines
//! - [`options`] - Process construction options

pub mod identifiers;
pub mod interpreter;
pub mod options;

// Re-export commonly used types
pub use identifiers::InstanceId;
pub use interpreter::Interpreter;
pub use options::{OutputMode, ProcessOptions, ProcessOptionsBuilder};

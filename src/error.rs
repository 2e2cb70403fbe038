//! Error types for ioscript

use thiserror::Error;

/// Main error type for ioscript
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Pipe or process creation failed; the instance under construction is unusable
    #[error("Resource error: {message}: {source}")]
    Resource {
        /// What was being created
        message: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Channel index outside `[0, count)`
    #[error("Channel index {index} out of range (channel count {count})")]
    ChannelIndex {
        /// Requested index
        index: usize,
        /// Number of channels on the instance
        count: usize,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Interpreter executable not found on PATH
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// A script lost its process after a failed respawn
    #[error("Script has no live process (a previous respawn failed)")]
    ProcessGone,

    /// I/O error while writing to the command stream or a channel
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error when loading options
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ioscript operations
pub type Result<T> = std::result::Result<T, ScriptError>;

impl ScriptError {
    /// Create a resource error
    pub fn resource(msg: impl Into<String>, source: std::io::Error) -> Self {
        Self::Resource {
            message: msg.into(),
            source,
        }
    }

    /// Create a channel index error
    #[must_use]
    pub const fn channel_index(index: usize, count: usize) -> Self {
        Self::ChannelIndex { index, count }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a command not found error
    pub fn command_not_found(cmd: impl Into<String>) -> Self {
        Self::CommandNotFound(cmd.into())
    }
}

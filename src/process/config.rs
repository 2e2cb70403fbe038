//! Configuration constants for the process layer

/// Upper bound (exclusive) on the number of data channels per process
///
/// Each channel costs two descriptors during construction, so this also keeps
/// a misused channel count from exhausting the descriptor table.
pub const MAX_CHANNELS: usize = 1024;

/// Shell used to run the interpreter command line, as `popen` does
pub const SHELL: &str = "/bin/sh";

//! Error type shared by the engines and the trace I/O layer.
//!
//! Allocation failures and unknown labels are not errors; the engines report them as
//! boolean outcomes. Only configuration and input problems end up here.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Non-positive frame count or memory size
    InvalidConfig(String),
    /// Replacement policy name not recognised
    UnknownPolicy(String),
    /// Malformed trace or script input (1-based line)
    Parse { line: usize, message: String },
    /// Reading or writing a trace file failed
    Io(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            SimError::UnknownPolicy(name) => {
                write!(f, "Unknown replacement policy: {} (expected FIFO or LRU)", name)
            }
            SimError::Parse { line, message } => write!(f, "Line {}: {}", line, message),
            SimError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}

pub type Result<T> = std::result::Result<T, SimError>;

//! Error types shared by the codec, the channel simulator and the pipeline.
//!
//! Only structural faults are errors. Channel-induced outcomes such as an
//! uncorrectable block or a lost frame are reported through
//! [`crate::pipeline::TerminalState`] instead.

use thiserror::Error;

/// Structural faults detected before any data is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An input did not have the shape the configuration expects
    /// (segment length, mask length, block length, probability range, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Code parameters or pipeline configuration cannot be used.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

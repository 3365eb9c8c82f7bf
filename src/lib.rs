//! Simulation of a noisy digital link protected by a Hamming code.
//!
//! A fixed-length bit segment is split into blocks, each block is encoded
//! with a (possibly extended) Hamming code, the frame crosses a binary
//! symmetric channel that flips bits and may drop the whole frame, and the
//! receiver decodes what arrives, correcting single-bit errors per block.
//!
//! - `bits`: conversions between bytes, bit strings and bit vectors
//! - `ecc`: the Hamming block codec and the segment framer
//! - `channel`: error masks, mask application, frame loss
//! - `config`: code parameters and channel probabilities
//! - `pipeline`: one transmission, from segment to terminal state
//! - `stats`: outcome counts over many seeded transmissions
//!
//! # Examples
//!
//! ```
//! use noisy_link::{bits, run, PipelineConfig, TerminalState};
//!
//! let segment = bits::from_bytes(&[0x5A; 120]);
//! let result = run(&segment, &PipelineConfig::noiseless()).unwrap();
//! assert_eq!(result.terminal_state, TerminalState::Delivered);
//! assert_eq!(result.recovered_segment, Some(segment));
//! ```

pub mod bits;
pub mod channel;
pub mod config;
pub mod ecc;
pub mod error;
pub mod pipeline;
pub mod stats;

pub use channel::{apply_mask, Channel, NoiseSource};
pub use config::{CodeParameters, PipelineConfig};
pub use ecc::{BlockCode, BlockOutcome, Frame, HammingCode, SegmentFramer};
pub use error::{Error, Result};
pub use pipeline::{run, run_with, Pipeline, PipelineResult, TerminalState};
pub use stats::{simulate_trials, LinkStatistics};

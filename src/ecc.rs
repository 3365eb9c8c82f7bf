//! Error correction codes for the simulated link.
//!
//! - [`hamming`]: single-error-correcting Hamming codes, optionally extended to SECDED
//! - [`framer`]: splits a segment into code blocks and reassembles it
//!
//! # Examples
//!
//! ```
//! use noisy_link::bits;
//! use noisy_link::ecc::{BlockCode, BlockOutcome, HammingCode};
//!
//! let code = HammingCode::standard_7_4();
//! let data = bits::parse("1011").unwrap();
//! let mut codeword = code.encode_block(&data).unwrap();
//! assert_eq!(bits::to_bit_string(&codeword), "0110011");
//!
//! let flipped = !codeword[2];
//! codeword.set(2, flipped);
//! let (decoded, outcome) = code.decode_block(&codeword).unwrap();
//! assert_eq!(outcome, BlockOutcome::Corrected(3));
//! assert_eq!(decoded, data);
//! ```

use crate::bits::{Bits, BitsRef};
use crate::error::Result;

/// What decoding one block found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockOutcome {
    /// Zero syndrome, data taken as-is
    Clean,
    /// One bit was flipped back; 1-indexed position within the codeword
    Corrected(usize),
    /// The error pattern cannot be a single flip; data returned uncorrected
    Uncorrectable,
}

impl BlockOutcome {
    pub fn is_corrected(&self) -> bool {
        matches!(self, BlockOutcome::Corrected(_))
    }

    pub fn is_uncorrectable(&self) -> bool {
        matches!(self, BlockOutcome::Uncorrectable)
    }
}

/// Trait for fixed-size block codes
pub trait BlockCode {
    /// Data bits per block
    fn data_len(&self) -> usize;

    /// Codeword bits per block
    fn block_len(&self) -> usize;

    /// Encode exactly `data_len()` bits into a `block_len()` bit codeword
    fn encode_block(&self, data: &BitsRef) -> Result<Bits>;

    /// Decode a `block_len()` bit codeword, correcting what can be corrected
    fn decode_block(&self, codeword: &BitsRef) -> Result<(Bits, BlockOutcome)>;
}

pub mod framer;
pub mod hamming;

pub use framer::{Frame, SegmentFramer};
pub use hamming::{HammingCode, ParityGroup};

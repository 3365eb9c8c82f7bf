//! Hamming error correction code implementation.
//!
//! Hamming codes are a family of linear error-correcting codes developed by Richard Hamming
//! in 1950. A Hamming code with `r` parity bits corrects any single flipped bit in a block of up to
//! `2^r - 1` bits. The most common variant is the (7,4) code, which encodes 4 data bits into
//! 7 bits by adding 3 parity bits.
//!
//! Parity bits sit at the power-of-two positions of the codeword (1-indexed: 1, 2, 4, 8, ...),
//! data bits fill the remaining positions in order. Parity bit `2^j` covers every position whose
//! binary index has bit `j` set, so the syndrome of a block with one flipped bit is exactly the
//! position of that bit.
//!
//! The extended (SECDED) variant appends one overall parity bit. It keeps single-error
//! correction and additionally detects, without correcting, any two-bit error.
//!
//! Shortened codes are supported: `k` may be smaller than `2^r - r - 1`, in which case the
//! codeword simply stops at position `k + r`.

use crate::bits::{Bits, BitsRef};
use crate::ecc::{BlockCode, BlockOutcome};
use crate::error::{Error, Result};
use bitvec::prelude::*;

/// Upper bound on parity bits, so a block holds at most 65535 Hamming bits.
const MAX_PARITY_BITS: usize = 16;

/// The codeword positions checked by one parity bit.
///
/// Membership follows from the binary index of a position, so nothing is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParityGroup {
    /// 0-indexed position of the parity bit itself
    pub parity_position: usize,
    hamming_len: usize,
}

impl ParityGroup {
    /// Whether the bit at 0-indexed `index` is checked by this parity bit (itself excluded)
    pub fn covers(&self, index: usize) -> bool {
        let mask = self.parity_position + 1;
        let pos = index + 1;
        index < self.hamming_len && pos & mask != 0 && pos != mask
    }

    /// 0-indexed positions of the other bits it covers
    pub fn covered(self) -> impl Iterator<Item = usize> {
        (0..self.hamming_len).filter(move |&idx| self.covers(idx))
    }
}

/// Represents a Hamming code configuration.
/// A Hamming(n,k) code encodes k data bits with r = n - k parity bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HammingCode {
    /// Number of data bits per block
    data_bits: usize,
    /// Number of parity bits per block, not counting the overall parity bit
    parity_bits: usize,
    /// Whether to use extended Hamming code with additional parity bit
    extended: bool,
    /// 0-indexed codeword positions holding data bits, in data order
    data_positions: Vec<usize>,
}

impl HammingCode {
    /// Creates a new Hamming code configuration.
    ///
    /// # Arguments
    ///
    /// * `data_bits` - Number of data bits to encode in each block
    /// * `parity_bits` - Number of Hamming parity bits per block
    /// * `extended` - Whether to use extended Hamming code with additional parity bit
    ///
    /// # Returns
    ///
    /// A new `HammingCode` instance, or `Error::InvalidParameters` when the parity bits
    /// cannot address every position of the block, or when some power-of-two parity
    /// position would fall outside it.
    pub fn new(data_bits: usize, parity_bits: usize, extended: bool) -> Result<Self> {
        if data_bits == 0 {
            return Err(Error::InvalidParameters(
                "Data bits must be positive".to_string(),
            ));
        }
        if parity_bits == 0 || parity_bits > MAX_PARITY_BITS {
            return Err(Error::InvalidParameters(format!(
                "Parity bits must be between 1 and {}, got {}",
                MAX_PARITY_BITS, parity_bits
            )));
        }

        let hamming_len = data_bits.checked_add(parity_bits).ok_or_else(|| {
            Error::InvalidParameters(format!("{} data bits do not fit in a block", data_bits))
        })?;
        if (1usize << parity_bits) <= hamming_len {
            return Err(Error::InvalidParameters(format!(
                "{} parity bits cannot protect {} data bits: need 2^r >= k + r + 1",
                parity_bits, data_bits
            )));
        }
        if (1usize << (parity_bits - 1)) > hamming_len {
            return Err(Error::InvalidParameters(format!(
                "Parity position {} lies outside a {}-bit block; use fewer parity bits",
                1usize << (parity_bits - 1),
                hamming_len
            )));
        }

        Ok(Self::build(data_bits, parity_bits, extended))
    }

    /// Creates a code with the fewest parity bits able to protect `data_bits`.
    pub fn with_minimum_redundancy(data_bits: usize, extended: bool) -> Result<Self> {
        // Smallest r with 2^r - r - 1 >= data_bits
        let mut parity_bits = 2;
        while parity_bits < MAX_PARITY_BITS && (1 << parity_bits) - parity_bits - 1 < data_bits {
            parity_bits += 1;
        }

        Self::new(data_bits, parity_bits, extended)
    }

    /// Creates a standard (7,4) Hamming code
    pub fn standard_7_4() -> Self {
        Self::build(4, 3, false)
    }

    /// Creates an extended (8,4) Hamming code
    pub fn extended_8_4() -> Self {
        Self::build(4, 3, true)
    }

    fn build(data_bits: usize, parity_bits: usize, extended: bool) -> Self {
        let hamming_len = data_bits + parity_bits;

        let data_positions = (1..=hamming_len)
            .filter(|pos: &usize| !pos.is_power_of_two())
            .map(|pos| pos - 1)
            .collect();

        HammingCode {
            data_bits,
            parity_bits,
            extended,
            data_positions,
        }
    }

    /// Number of data bits per block
    pub fn data_bits(&self) -> usize {
        self.data_bits
    }

    /// Number of Hamming parity bits per block
    pub fn parity_bits(&self) -> usize {
        self.parity_bits
    }

    /// Whether the overall parity bit is present
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Gets the total code word length (data bits + parity bits, plus the overall bit if extended)
    pub fn total_bits(&self) -> usize {
        let base = self.data_bits + self.parity_bits;
        if self.extended {
            base + 1
        } else {
            base
        }
    }

    /// The parity-check relation, one group per parity bit, lowest position first.
    pub fn parity_groups(&self) -> impl Iterator<Item = ParityGroup> {
        let hamming_len = self.data_bits + self.parity_bits;
        (0..self.parity_bits).map(move |j| ParityGroup {
            parity_position: (1 << j) - 1,
            hamming_len,
        })
    }

    /// 0-indexed codeword positions that carry data bits.
    pub fn data_positions(&self) -> &[usize] {
        &self.data_positions
    }

    /// Number of output bits for a segment of `segment_bits` input bits
    pub fn encoded_bits_needed(&self, segment_bits: usize) -> usize {
        segment_bits.div_ceil(self.data_bits) * self.total_bits()
    }

    /// Computes the syndrome of a codeword: bit `j` is set when the group of parity bit
    /// `2^j` has odd parity. A single flipped bit yields its own 1-indexed position.
    ///
    /// Bit `j` of the XOR of the 1-indexed positions of all set bits is exactly the
    /// parity of group `j`, so one pass over the set bits covers every group.
    pub fn syndrome(&self, codeword: &BitsRef) -> usize {
        let hamming_len = self.data_bits + self.parity_bits;
        codeword[..hamming_len]
            .iter_ones()
            .fold(0, |acc, idx| acc ^ (idx + 1))
    }

    fn check_len(&self, what: &str, bits: &BitsRef, expected: usize) -> Result<()> {
        if bits.len() != expected {
            return Err(Error::InvalidInput(format!(
                "{} must be {} bits, got {}",
                what,
                expected,
                bits.len()
            )));
        }
        Ok(())
    }

    fn extract_data(&self, codeword: &BitsRef) -> Bits {
        self.data_positions
            .iter()
            .map(|&pos| codeword[pos])
            .collect()
    }
}

impl BlockCode for HammingCode {
    fn data_len(&self) -> usize {
        self.data_bits
    }

    fn block_len(&self) -> usize {
        self.total_bits()
    }

    /// Encodes a single block of data bits
    fn encode_block(&self, data: &BitsRef) -> Result<Bits> {
        self.check_len("Data block", data, self.data_bits)?;

        let hamming_len = self.data_bits + self.parity_bits;
        let mut codeword = bitvec![u8, Msb0; 0; self.total_bits()];

        for (bit, &pos) in data.iter().by_vals().zip(&self.data_positions) {
            codeword.set(pos, bit);
        }

        // Parity bits are still zero, so the syndrome holds every group's data parity
        let checks = self.syndrome(&codeword);
        for group in self.parity_groups() {
            let parity = checks & (group.parity_position + 1) != 0;
            codeword.set(group.parity_position, parity);
        }

        // Overall parity makes the whole codeword even
        if self.extended {
            let overall = codeword[..hamming_len].count_ones() % 2 == 1;
            codeword.set(hamming_len, overall);
        }

        Ok(codeword)
    }

    /// Decodes a single block of encoded bits
    fn decode_block(&self, codeword: &BitsRef) -> Result<(Bits, BlockOutcome)> {
        self.check_len("Codeword", codeword, self.total_bits())?;

        let hamming_len = self.data_bits + self.parity_bits;
        let syndrome = self.syndrome(codeword);
        let overall_even = !self.extended || codeword.count_ones() % 2 == 0;

        let outcome = if syndrome == 0 {
            if overall_even {
                BlockOutcome::Clean
            } else {
                // Only the overall parity bit itself flipped
                BlockOutcome::Corrected(self.total_bits())
            }
        } else if self.extended && overall_even {
            // Even number of flips with a non-zero syndrome: at least two errors
            BlockOutcome::Uncorrectable
        } else if syndrome <= hamming_len {
            BlockOutcome::Corrected(syndrome)
        } else {
            // Points past the end of a shortened block, so it cannot be a single error
            BlockOutcome::Uncorrectable
        };

        let data = match outcome {
            BlockOutcome::Corrected(position) => {
                let mut corrected = codeword.to_bitvec();
                let error_pos = position - 1;
                let flipped = !corrected[error_pos];
                corrected.set(error_pos, flipped);
                self.extract_data(&corrected)
            }
            BlockOutcome::Clean | BlockOutcome::Uncorrectable => self.extract_data(codeword),
        };

        Ok((data, outcome))
    }
}

//! Link configuration.
//!
//! Code parameters and channel probabilities are fixed for the lifetime of a
//! [`crate::pipeline::Pipeline`]; nothing here is negotiated at runtime.

use crate::channel::check_probability;
use crate::ecc::HammingCode;
use crate::error::{Error, Result};

/// Segment length handed in by the transport layer: 120 bytes
pub const DEFAULT_SEGMENT_BITS: usize = 960;
/// Per-bit flip probability of the default channel
pub const DEFAULT_FLIP_PROBABILITY: f64 = 0.001;
/// Frame loss probability of the default channel
pub const DEFAULT_LOSS_PROBABILITY: f64 = 0.01;

/// Parameters of the Hamming code protecting each block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeParameters {
    /// Data bits per block (k)
    pub data_bits: usize,
    /// Hamming parity bits per block (r)
    pub parity_bits: usize,
    /// Append an overall parity bit for double-error detection
    pub secded: bool,
}

impl Default for CodeParameters {
    fn default() -> Self {
        Self::hamming_7_4()
    }
}

impl CodeParameters {
    pub fn new(data_bits: usize, parity_bits: usize, secded: bool) -> Self {
        Self {
            data_bits,
            parity_bits,
            secded,
        }
    }

    /// Hamming(7,4)
    pub fn hamming_7_4() -> Self {
        Self::new(4, 3, false)
    }

    /// Extended Hamming(8,4)
    pub fn extended_8_4() -> Self {
        Self::new(4, 3, true)
    }

    /// Codeword length including the overall parity bit when enabled.
    /// Saturates for parameters `build` would reject.
    pub fn block_bits(&self) -> usize {
        self.data_bits
            .saturating_add(self.parity_bits)
            .saturating_add(usize::from(self.secded))
    }

    /// Builds the code, validating the parameters
    pub fn build(&self) -> Result<HammingCode> {
        HammingCode::new(self.data_bits, self.parity_bits, self.secded)
    }
}

/// Everything one pipeline run needs to know
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub code: CodeParameters,
    /// Exact segment length accepted by the pipeline
    pub segment_bits: usize,
    /// Independent per-bit flip probability in [0, 1]
    pub flip_probability: f64,
    /// Whole-frame loss probability in [0, 1]
    pub loss_probability: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            code: CodeParameters::default(),
            segment_bits: DEFAULT_SEGMENT_BITS,
            flip_probability: DEFAULT_FLIP_PROBABILITY,
            loss_probability: DEFAULT_LOSS_PROBABILITY,
        }
    }
}

impl PipelineConfig {
    /// Default code and segment length over a perfect channel
    pub fn noiseless() -> Self {
        Self {
            flip_probability: 0.0,
            loss_probability: 0.0,
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: CodeParameters) -> Self {
        self.code = code;
        self
    }

    pub fn with_secded(mut self, secded: bool) -> Self {
        self.code.secded = secded;
        self
    }

    pub fn with_segment_bits(mut self, segment_bits: usize) -> Self {
        self.segment_bits = segment_bits;
        self
    }

    pub fn with_flip_probability(mut self, flip_probability: f64) -> Self {
        self.flip_probability = flip_probability;
        self
    }

    pub fn with_loss_probability(mut self, loss_probability: f64) -> Self {
        self.loss_probability = loss_probability;
        self
    }

    /// Frame length produced for a segment of `segment_bits`
    pub fn frame_bits(&self) -> usize {
        self.segment_bits
            .div_ceil(self.code.data_bits.max(1))
            .saturating_mul(self.code.block_bits())
    }

    /// Checks code parameters, probabilities and segment length.
    pub fn validate(&self) -> Result<()> {
        self.build_code().map(|_| ())
    }

    /// Validates the whole configuration and returns the code it describes.
    pub fn build_code(&self) -> Result<HammingCode> {
        let code = self.code.build()?;

        if self.segment_bits == 0 {
            return Err(Error::InvalidParameters(
                "Segment length must be positive".to_string(),
            ));
        }

        check_probability("flip", self.flip_probability)
            .and_then(|_| check_probability("loss", self.loss_probability))
            .map_err(|e| match e {
                Error::InvalidInput(msg) => Error::InvalidParameters(msg),
                other => other,
            })?;

        Ok(code)
    }
}

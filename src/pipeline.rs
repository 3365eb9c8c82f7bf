//! One simulated transmission of a segment over the noisy link.
//!
//! ```text
//! Encoding -> Corrupting -> Decoding -> Delivered | PartiallyCorrected | Uncorrectable
//!                 |
//!                 +-> Lost
//! ```
//!
//! A lost frame is discarded before decoding. Uncorrectable and lost frames
//! are ordinary outcomes of the simulation and come back as a
//! [`TerminalState`]; only structural problems such as a segment of the wrong
//! length are errors.

use crate::bits::{difference_positions, to_bit_string, Bits, BitsRef};
use crate::channel::{apply_mask, Channel, NoiseSource};
use crate::config::PipelineConfig;
use crate::ecc::{BlockOutcome, Frame, SegmentFramer};
use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::fmt;

/// How a transmission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalState {
    /// Every block decoded with a zero syndrome
    Delivered,
    /// Delivered, but at least one block needed a correction
    PartiallyCorrected,
    /// At least one block held an error pattern that could not be corrected
    Uncorrectable,
    /// The channel dropped the whole frame
    Lost,
}

impl TerminalState {
    /// Classifies a decoded frame from its block outcomes
    pub fn from_outcomes(outcomes: &[BlockOutcome]) -> Self {
        if outcomes.iter().any(BlockOutcome::is_uncorrectable) {
            TerminalState::Uncorrectable
        } else if outcomes.iter().any(BlockOutcome::is_corrected) {
            TerminalState::PartiallyCorrected
        } else {
            TerminalState::Delivered
        }
    }

    /// `PartiallyCorrected` counts as delivered
    pub fn is_delivered(&self) -> bool {
        matches!(
            self,
            TerminalState::Delivered | TerminalState::PartiallyCorrected
        )
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminalState::Delivered => "delivered",
            TerminalState::PartiallyCorrected => "partially corrected",
            TerminalState::Uncorrectable => "uncorrectable",
            TerminalState::Lost => "lost",
        };
        f.write_str(name)
    }
}

/// Result of one transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    pub terminal_state: TerminalState,
    /// Decoded segment; `None` when the frame was lost
    pub recovered_segment: Option<Bits>,
    /// One entry per code block, empty when the frame was lost
    pub per_block_outcomes: Vec<BlockOutcome>,
    /// Diagnostic only: indices where the recovered segment differs from the original
    pub bit_difference_positions: Vec<usize>,
    /// Number of frame bits the channel flipped
    pub flipped_bits: usize,
    /// Length of the transmitted frame
    pub frame_bits: usize,
}

impl PipelineResult {
    pub fn corrected_blocks(&self) -> usize {
        self.per_block_outcomes
            .iter()
            .filter(|o| o.is_corrected())
            .count()
    }

    pub fn uncorrectable_blocks(&self) -> usize {
        self.per_block_outcomes
            .iter()
            .filter(|o| o.is_uncorrectable())
            .count()
    }

    /// Delivered as good, yet the segment differs from what was sent
    pub fn is_silently_corrupted(&self) -> bool {
        self.terminal_state.is_delivered() && !self.bit_difference_positions.is_empty()
    }
}

/// A validated configuration with its codec built once, reusable across runs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    framer: SegmentFramer,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let framer = SegmentFramer::new(config.build_code()?);
        Ok(Self { config, framer })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn framer(&self) -> &SegmentFramer {
        &self.framer
    }

    /// Runs `segment` through encode, channel and decode using `noise`.
    pub fn transmit<N>(&self, segment: &BitsRef, noise: &mut N) -> Result<PipelineResult>
    where
        N: NoiseSource + ?Sized,
    {
        if segment.len() != self.config.segment_bits {
            return Err(Error::InvalidInput(format!(
                "segment length is {} bits, expected {}",
                segment.len(),
                self.config.segment_bits
            )));
        }

        let frame = self.framer.frame_encode(segment)?;
        let frame_bits = frame.len();
        debug!(
            "encoded {}-bit segment into {}-bit frame ({} padding bits)",
            segment.len(),
            frame_bits,
            frame.padding
        );

        let mask = noise.generate_error_mask(frame_bits, self.config.flip_probability)?;
        let flipped_bits = mask.count_ones();
        if flipped_bits == 0 {
            debug!("error mask is empty, frame passes unchanged");
        } else {
            debug!(
                "error mask flips {} bits: {}",
                flipped_bits,
                to_bit_string(&mask)
            );
        }

        let corrupted = Frame {
            bits: apply_mask(&frame.bits, &mask)?,
            padding: frame.padding,
        };

        if noise.decide_frame_loss(self.config.loss_probability)? {
            info!("frame lost in channel, {} flipped bits discarded", flipped_bits);
            return Ok(PipelineResult {
                terminal_state: TerminalState::Lost,
                recovered_segment: None,
                per_block_outcomes: Vec::new(),
                bit_difference_positions: Vec::new(),
                flipped_bits,
                frame_bits,
            });
        }

        let (recovered, outcomes) = self.framer.frame_decode(&corrupted)?;
        for (block, outcome) in outcomes.iter().enumerate() {
            match outcome {
                BlockOutcome::Clean => {}
                BlockOutcome::Corrected(position) => {
                    debug!("block {}: corrected bit {}", block, position)
                }
                BlockOutcome::Uncorrectable => debug!("block {}: uncorrectable", block),
            }
        }

        let terminal_state = TerminalState::from_outcomes(&outcomes);
        let bit_difference_positions = difference_positions(segment, &recovered);
        if bit_difference_positions.is_empty() {
            debug!("segment recovered unchanged");
        } else {
            let indices: Vec<String> = bit_difference_positions
                .iter()
                .map(|idx| idx.to_string())
                .collect();
            warn!(
                "recovered segment differs at bit indices: {}",
                indices.join(", ")
            );
        }
        info!(
            "transmission {}: {} flipped bits, {} blocks corrected",
            terminal_state,
            flipped_bits,
            outcomes.iter().filter(|o| o.is_corrected()).count()
        );

        Ok(PipelineResult {
            terminal_state,
            recovered_segment: Some(recovered),
            per_block_outcomes: outcomes,
            bit_difference_positions,
            flipped_bits,
            frame_bits,
        })
    }
}

/// Runs one transmission over a channel seeded from OS entropy.
pub fn run(segment: &BitsRef, config: &PipelineConfig) -> Result<PipelineResult> {
    let mut channel = Channel::from_entropy();
    run_with(segment, config, &mut channel)
}

/// Runs one transmission with an injected noise source.
pub fn run_with<N>(
    segment: &BitsRef,
    config: &PipelineConfig,
    noise: &mut N,
) -> Result<PipelineResult>
where
    N: NoiseSource + ?Sized,
{
    Pipeline::new(*config)?.transmit(segment, noise)
}

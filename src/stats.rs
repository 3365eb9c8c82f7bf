//! Outcome statistics over many independent transmissions.
//!
//! Trials run in parallel. Trial `i` owns a ChaCha20 generator seeded with
//! `seed + i`, so no generator state is shared and a given seed always yields
//! the same totals regardless of scheduling.

use crate::bits::BitsRef;
use crate::channel::Channel;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineResult, TerminalState};
use rayon::prelude::*;
use std::fmt;

/// Aggregated counts over a batch of transmissions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStatistics {
    pub trials: u64,
    pub delivered: u64,
    pub partially_corrected: u64,
    pub uncorrectable: u64,
    pub lost: u64,
    /// Delivered as good but different from the original segment
    pub silent_corruptions: u64,
    pub corrected_blocks: u64,
    pub uncorrectable_blocks: u64,
    /// Frame bits flipped by the channel, lost frames included
    pub flipped_bits: u64,
    /// Segment bits that came out wrong among frames that were decoded
    pub residual_bit_errors: u64,
    /// Segment bits decoded, i.e. segment length times frames not lost
    pub decoded_bits: u64,
}

impl LinkStatistics {
    /// Statistics of a single transmission
    pub fn from_result(result: &PipelineResult) -> Self {
        let mut stats = Self {
            trials: 1,
            flipped_bits: result.flipped_bits as u64,
            ..Self::default()
        };

        match result.terminal_state {
            TerminalState::Delivered => stats.delivered = 1,
            TerminalState::PartiallyCorrected => stats.partially_corrected = 1,
            TerminalState::Uncorrectable => stats.uncorrectable = 1,
            TerminalState::Lost => stats.lost = 1,
        }

        if let Some(segment) = &result.recovered_segment {
            stats.decoded_bits = segment.len() as u64;
            stats.residual_bit_errors = result.bit_difference_positions.len() as u64;
        }
        stats.silent_corruptions = u64::from(result.is_silently_corrupted());
        stats.corrected_blocks = result.corrected_blocks() as u64;
        stats.uncorrectable_blocks = result.uncorrectable_blocks() as u64;

        stats
    }

    /// Sums two sets of counts
    pub fn merge(self, other: Self) -> Self {
        Self {
            trials: self.trials + other.trials,
            delivered: self.delivered + other.delivered,
            partially_corrected: self.partially_corrected + other.partially_corrected,
            uncorrectable: self.uncorrectable + other.uncorrectable,
            lost: self.lost + other.lost,
            silent_corruptions: self.silent_corruptions + other.silent_corruptions,
            corrected_blocks: self.corrected_blocks + other.corrected_blocks,
            uncorrectable_blocks: self.uncorrectable_blocks + other.uncorrectable_blocks,
            flipped_bits: self.flipped_bits + other.flipped_bits,
            residual_bit_errors: self.residual_bit_errors + other.residual_bit_errors,
            decoded_bits: self.decoded_bits + other.decoded_bits,
        }
    }

    fn ratio(part: u64, whole: u64) -> f64 {
        if whole == 0 {
            0.0
        } else {
            part as f64 / whole as f64
        }
    }

    /// Share of trials ending `Delivered` or `PartiallyCorrected`
    pub fn delivery_rate(&self) -> f64 {
        Self::ratio(self.delivered + self.partially_corrected, self.trials)
    }

    pub fn loss_rate(&self) -> f64 {
        Self::ratio(self.lost, self.trials)
    }

    pub fn uncorrectable_rate(&self) -> f64 {
        Self::ratio(self.uncorrectable, self.trials)
    }

    /// Wrong segment bits per decoded segment bit
    pub fn residual_bit_error_rate(&self) -> f64 {
        Self::ratio(self.residual_bit_errors, self.decoded_bits)
    }
}

impl fmt::Display for LinkStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "trials:               {}", self.trials)?;
        writeln!(
            f,
            "delivered:            {} ({} after correction)",
            self.delivered + self.partially_corrected,
            self.partially_corrected
        )?;
        writeln!(f, "uncorrectable:        {}", self.uncorrectable)?;
        writeln!(f, "lost:                 {}", self.lost)?;
        writeln!(f, "silent corruptions:   {}", self.silent_corruptions)?;
        writeln!(f, "corrected blocks:     {}", self.corrected_blocks)?;
        writeln!(f, "uncorrectable blocks: {}", self.uncorrectable_blocks)?;
        writeln!(f, "flipped frame bits:   {}", self.flipped_bits)?;
        writeln!(f, "delivery rate:        {:.4}", self.delivery_rate())?;
        writeln!(f, "loss rate:            {:.4}", self.loss_rate())?;
        write!(
            f,
            "residual bit errors:  {} ({:.3e} per bit)",
            self.residual_bit_errors,
            self.residual_bit_error_rate()
        )
    }
}

/// Sends `segment` through `trials` independent transmissions and aggregates the outcomes.
pub fn simulate_trials(
    segment: &BitsRef,
    config: &PipelineConfig,
    trials: usize,
    seed: u64,
) -> Result<LinkStatistics> {
    let pipeline = Pipeline::new(*config)?;

    (0..trials)
        .into_par_iter()
        .map(|trial| {
            let mut channel = Channel::with_seed(seed.wrapping_add(trial as u64));
            pipeline
                .transmit(segment, &mut channel)
                .map(|result| LinkStatistics::from_result(&result))
        })
        .try_reduce(LinkStatistics::default, |a, b| Ok(a.merge(b)))
}

//! Channel simulator: independent bit flips and whole-frame loss.
//!
//! The channel is a memoryless binary symmetric channel. Every frame bit is
//! flipped independently with the same probability; there is no burst model.
//! Frame loss is a separate Bernoulli draw, so a frame can be lost whether or
//! not its bits were hit.
//!
//! All randomness goes through a [`NoiseSource`]. [`Channel`] draws from any
//! `rand::Rng`, by default a ChaCha20 generator seeded from OS entropy or from
//! an explicit seed for reproducible runs. Tests can implement `NoiseSource`
//! directly to force exact error patterns and loss decisions.

use crate::bits::{Bits, BitsRef};
use crate::error::{Error, Result};
use rand::distributions::{Bernoulli, Distribution};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Source of channel noise for one transmission.
pub trait NoiseSource {
    /// Produce a `length`-bit mask with each bit set with probability `flip_probability`.
    fn generate_error_mask(&mut self, length: usize, flip_probability: f64) -> Result<Bits>;

    /// Decide whether the whole frame is lost.
    fn decide_frame_loss(&mut self, loss_probability: f64) -> Result<bool>;
}

/// Binary symmetric channel with frame loss, driven by a random number generator.
#[derive(Debug, Clone)]
pub struct Channel<R = ChaCha20Rng> {
    rng: R,
}

impl Channel<ChaCha20Rng> {
    /// Create a channel seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Create a reproducible channel from a seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> Channel<R> {
    /// Create a channel around an existing generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> NoiseSource for Channel<R> {
    fn generate_error_mask(&mut self, length: usize, flip_probability: f64) -> Result<Bits> {
        let flip = bernoulli("flip", flip_probability)?;
        Ok((0..length).map(|_| flip.sample(&mut self.rng)).collect())
    }

    fn decide_frame_loss(&mut self, loss_probability: f64) -> Result<bool> {
        let loss = bernoulli("loss", loss_probability)?;
        Ok(loss.sample(&mut self.rng))
    }
}

/// Checks that `p` is a probability.
pub fn check_probability(name: &str, p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::InvalidInput(format!(
            "{} probability must be within [0, 1], got {}",
            name, p
        )));
    }
    Ok(())
}

fn bernoulli(name: &str, p: f64) -> Result<Bernoulli> {
    check_probability(name, p)?;
    Bernoulli::new(p).map_err(|e| Error::InvalidInput(format!("{} probability: {}", name, e)))
}

/// XORs `mask` onto `frame`.
///
/// # Errors
///
/// `Error::InvalidInput` if the lengths differ; nothing is modified in that case.
pub fn apply_mask(frame: &BitsRef, mask: &BitsRef) -> Result<Bits> {
    if frame.len() != mask.len() {
        return Err(Error::InvalidInput(format!(
            "Error mask has {} bits but the frame has {}",
            mask.len(),
            frame.len()
        )));
    }

    let mut corrupted = Bits::with_capacity(frame.len());
    corrupted.extend_from_bitslice(frame);
    for idx in mask.iter_ones() {
        let bit = corrupted[idx];
        corrupted.set(idx, !bit);
    }

    Ok(corrupted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::parse;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mask_length() {
        let mut channel = Channel::with_seed(7);
        for length in [0, 1, 7, 960, 1680] {
            for p in [0.0, 0.25, 0.5, 1.0] {
                let mask = channel.generate_error_mask(length, p).unwrap();
                assert_eq!(mask.len(), length);
            }
        }
    }

    #[test]
    fn test_mask_extremes() {
        let mut channel = Channel::with_seed(1);
        assert_eq!(channel.generate_error_mask(500, 0.0).unwrap().count_ones(), 0);
        assert_eq!(channel.generate_error_mask(500, 1.0).unwrap().count_ones(), 500);
    }

    #[test]
    fn test_mask_density() {
        let mut channel = Channel::with_seed(42);
        let mask = channel.generate_error_mask(100_000, 0.1).unwrap();
        let density = mask.count_ones() as f64 / mask.len() as f64;
        assert_abs_diff_eq!(density, 0.1, epsilon = 0.01);
    }

    #[test]
    fn test_seeded_channels_agree() {
        let mut a = Channel::with_seed(99);
        let mut b = Channel::with_seed(99);
        assert_eq!(
            a.generate_error_mask(256, 0.3).unwrap(),
            b.generate_error_mask(256, 0.3).unwrap()
        );
        assert_eq!(
            a.decide_frame_loss(0.5).unwrap(),
            b.decide_frame_loss(0.5).unwrap()
        );
    }

    #[test]
    fn test_frame_loss_extremes() {
        let mut channel = Channel::from_entropy();
        for _ in 0..100 {
            assert!(channel.decide_frame_loss(1.0).unwrap());
            assert!(!channel.decide_frame_loss(0.0).unwrap());
        }
    }

    #[test]
    fn test_invalid_probabilities() {
        let mut channel = Channel::with_seed(0);
        for p in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                channel.generate_error_mask(8, p),
                Err(Error::InvalidInput(_))
            ));
            assert!(matches!(
                channel.decide_frame_loss(p),
                Err(Error::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_apply_mask() {
        let frame = parse("0110011").unwrap();
        let mask = parse("0010001").unwrap();
        let corrupted = apply_mask(&frame, &mask).unwrap();
        assert_eq!(corrupted, parse("0100010").unwrap());

        let zero = parse("0000000").unwrap();
        assert_eq!(apply_mask(&frame, &zero).unwrap(), frame);
    }

    #[test]
    fn test_apply_mask_length_mismatch() {
        let frame = parse("0110011").unwrap();
        let mask = parse("001").unwrap();
        assert!(matches!(
            apply_mask(&frame, &mask),
            Err(Error::InvalidInput(_))
        ));
    }
}

use noisy_link::bits::{self, Bits};
use noisy_link::{
    run, run_with, simulate_trials, BlockOutcome, Channel, CodeParameters, Error, NoiseSource,
    PipelineConfig, Result, SegmentFramer, TerminalState,
};

/// Flips exactly the listed frame bits and never loses the frame.
struct FixedFlips(Vec<usize>);

impl NoiseSource for FixedFlips {
    fn generate_error_mask(&mut self, length: usize, _: f64) -> Result<Bits> {
        let mut mask = Bits::repeat(false, length);
        for &idx in &self.0 {
            mask.set(idx, true);
        }
        Ok(mask)
    }

    fn decide_frame_loss(&mut self, _: f64) -> Result<bool> {
        Ok(false)
    }
}

fn transport_segment() -> Bits {
    let bytes: Vec<u8> = (0..120u8).map(|b| b.wrapping_mul(37) ^ 0x5C).collect();
    bits::from_bytes(&bytes)
}

#[test]
fn test_reference_example() {
    let config = PipelineConfig::noiseless().with_segment_bits(4);
    let segment = bits::parse("1011").unwrap();

    let framer = SegmentFramer::new(config.code.build().unwrap());
    let frame = framer.frame_encode(&segment).unwrap();
    assert_eq!(bits::to_bit_string(&frame.bits), "0110011");

    let result = run_with(&segment, &config, &mut FixedFlips(vec![2])).unwrap();
    assert_eq!(result.per_block_outcomes, vec![BlockOutcome::Corrected(3)]);
    assert_eq!(result.recovered_segment, Some(segment.clone()));

    let result = run(&segment, &config).unwrap();
    assert_eq!(result.terminal_state, TerminalState::Delivered);
    assert_eq!(result.recovered_segment, Some(segment));
    assert!(result.bit_difference_positions.is_empty());
}

#[test]
fn test_noiseless_round_trip_of_transport_segment() {
    for code in [CodeParameters::hamming_7_4(), CodeParameters::extended_8_4()] {
        let config = PipelineConfig::noiseless().with_code(code);
        let segment = transport_segment();
        let result = run(&segment, &config).unwrap();

        assert_eq!(result.terminal_state, TerminalState::Delivered);
        assert_eq!(result.frame_bits, config.frame_bits());
        let recovered = result.recovered_segment.unwrap();
        assert_eq!(bits::to_bytes(&recovered), bits::to_bytes(&segment));
    }
}

#[test]
fn test_one_flip_per_block_is_always_repaired() {
    let config = PipelineConfig::noiseless().with_code(CodeParameters::new(11, 4, false));
    let segment = transport_segment();
    let blocks = config.segment_bits.div_ceil(11);

    // A different position in every block
    let flips: Vec<usize> = (0..blocks).map(|b| b * 15 + b % 15).collect();
    let result = run_with(&segment, &config, &mut FixedFlips(flips)).unwrap();

    assert_eq!(result.terminal_state, TerminalState::PartiallyCorrected);
    assert_eq!(result.corrected_blocks(), blocks);
    assert_eq!(result.recovered_segment, Some(segment));
}

#[test]
fn test_secded_flags_double_errors() {
    let config = PipelineConfig::noiseless().with_secded(true);
    let segment = transport_segment();

    let result = run_with(&segment, &config, &mut FixedFlips(vec![8, 13])).unwrap();
    assert_eq!(result.terminal_state, TerminalState::Uncorrectable);
    assert_eq!(result.per_block_outcomes[1], BlockOutcome::Uncorrectable);
    assert_eq!(result.uncorrectable_blocks(), 1);
    assert!(!result.is_silently_corrupted());
}

#[test]
fn test_certain_loss_always_lost() {
    for flip in [0.0, 0.05, 1.0] {
        let config = PipelineConfig::default()
            .with_flip_probability(flip)
            .with_loss_probability(1.0);
        let mut channel = Channel::with_seed(5);
        for _ in 0..20 {
            let result = run_with(&transport_segment(), &config, &mut channel).unwrap();
            assert_eq!(result.terminal_state, TerminalState::Lost);
            assert!(result.recovered_segment.is_none());
        }
    }
}

#[test]
fn test_all_ones_mask_passes_as_a_codeword() {
    let config = PipelineConfig::noiseless()
        .with_secded(true)
        .with_flip_probability(1.0);
    let result = run(&transport_segment(), &config).unwrap();
    // An all-ones mask flips 8 bits per block: even weight, zero syndrome
    assert_eq!(result.flipped_bits, result.frame_bits);
    assert_eq!(result.terminal_state, TerminalState::Delivered);
    assert_eq!(result.bit_difference_positions.len(), config.segment_bits);
    assert!(result.is_silently_corrupted());
}

#[test]
fn test_invalid_input_has_no_partial_result() {
    let config = PipelineConfig::default();
    let short = bits::from_bytes(&[0u8; 119]);
    assert!(matches!(run(&short, &config), Err(Error::InvalidInput(_))));

    let bad = PipelineConfig::default().with_code(CodeParameters::new(4, 2, false));
    assert!(matches!(
        run(&transport_segment(), &bad),
        Err(Error::InvalidParameters(_))
    ));
}

#[test]
fn test_seeded_batches_are_reproducible() {
    let config = PipelineConfig::default().with_flip_probability(0.02);
    let a = simulate_trials(&transport_segment(), &config, 100, 2024).unwrap();
    let b = simulate_trials(&transport_segment(), &config, 100, 2024).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.trials, 100);
    assert!(a.corrected_blocks > 0);
}

//! Segment framing: cutting a segment into code blocks and putting it back together.
//!
//! Blocks are independent, so encoding and decoding fan out over `rayon` and are
//! reassembled in block order.

use crate::bits::{Bits, BitsRef};
use crate::ecc::{BlockCode, BlockOutcome, HammingCode};
use crate::error::{Error, Result};
use rayon::prelude::*;

/// An encoded segment.
///
/// `padding` is framing metadata kept beside the codewords, not inside them:
/// the number of zero bits appended to fill the last data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub bits: Bits,
    pub padding: usize,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

/// Drives a block code over whole segments.
#[derive(Debug, Clone)]
pub struct SegmentFramer<C = HammingCode> {
    code: C,
}

impl<C: BlockCode + Sync> SegmentFramer<C> {
    pub fn new(code: C) -> Self {
        Self { code }
    }

    pub fn code(&self) -> &C {
        &self.code
    }

    /// Frame length for a segment of `segment_bits` bits
    pub fn frame_len(&self, segment_bits: usize) -> usize {
        segment_bits.div_ceil(self.code.data_len()) * self.code.block_len()
    }

    /// Splits `segment` into data blocks, zero-pads the last one and encodes each.
    pub fn frame_encode(&self, segment: &BitsRef) -> Result<Frame> {
        let k = self.code.data_len();
        let blocks = segment.len().div_ceil(k);
        let padding = blocks * k - segment.len();

        let codewords = (0..blocks)
            .into_par_iter()
            .map(|idx| {
                let start = idx * k;
                let end = (start + k).min(segment.len());
                if end - start == k {
                    self.code.encode_block(&segment[start..end])
                } else {
                    let mut group = Bits::with_capacity(k);
                    group.extend_from_bitslice(&segment[start..end]);
                    group.resize(k, false);
                    self.code.encode_block(&group)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut bits = Bits::with_capacity(blocks * self.code.block_len());
        for codeword in &codewords {
            bits.extend_from_bitslice(codeword);
        }

        Ok(Frame { bits, padding })
    }

    /// Decodes every codeword of `frame` and strips the padding.
    ///
    /// Returns the recovered segment and one outcome per block, in block order.
    pub fn frame_decode(&self, frame: &Frame) -> Result<(Bits, Vec<BlockOutcome>)> {
        let k = self.code.data_len();
        let n = self.code.block_len();

        if frame.bits.len() % n != 0 {
            return Err(Error::InvalidInput(format!(
                "Frame length {} is not a multiple of the {}-bit block length",
                frame.bits.len(),
                n
            )));
        }
        let blocks = frame.bits.len() / n;
        if frame.padding > 0 && (blocks == 0 || frame.padding >= k) {
            return Err(Error::InvalidInput(format!(
                "Padding of {} bits is impossible for {} blocks of {} data bits",
                frame.padding, blocks, k
            )));
        }

        let decoded = (0..blocks)
            .into_par_iter()
            .map(|idx| self.code.decode_block(&frame.bits[idx * n..(idx + 1) * n]))
            .collect::<Result<Vec<_>>>()?;

        let mut segment = Bits::with_capacity(blocks * k);
        let mut outcomes = Vec::with_capacity(blocks);
        for (data, outcome) in decoded {
            segment.extend_from_bitslice(&data);
            outcomes.push(outcome);
        }
        segment.truncate(segment.len() - frame.padding);

        Ok((segment, outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{parse, to_bit_string};

    #[test]
    fn test_frame_length_and_padding() {
        let framer = SegmentFramer::new(HammingCode::standard_7_4());
        let segment = parse("10110").unwrap();

        let frame = framer.frame_encode(&segment).unwrap();
        assert_eq!(frame.len(), 14);
        assert_eq!(frame.padding, 3);
        assert_eq!(framer.frame_len(5), 14);

        // Second block is 1000 after padding
        let second = framer.code().encode_block(&parse("1000").unwrap()).unwrap();
        assert_eq!(&frame.bits[7..], &second[..]);
    }

    #[test]
    fn test_round_trip_without_noise() {
        let framer = SegmentFramer::new(HammingCode::extended_8_4());
        for text in ["", "1", "1011", "101100111", "1111000011110000101"] {
            let segment = parse(text).unwrap();
            let frame = framer.frame_encode(&segment).unwrap();
            let (decoded, outcomes) = framer.frame_decode(&frame).unwrap();
            assert_eq!(decoded, segment);
            assert!(outcomes.iter().all(|o| *o == BlockOutcome::Clean));
            assert_eq!(outcomes.len(), segment.len().div_ceil(4));
        }
    }

    #[test]
    fn test_frame_is_concatenation_of_blocks() {
        let framer = SegmentFramer::new(HammingCode::standard_7_4());
        let frame = framer.frame_encode(&parse("10111011").unwrap()).unwrap();
        assert_eq!(to_bit_string(&frame.bits), "01100110110011");
    }

    #[test]
    fn test_per_block_outcomes() {
        let framer = SegmentFramer::new(HammingCode::extended_8_4());
        let segment = parse("1011 0110 1110").unwrap();
        let mut frame = framer.frame_encode(&segment).unwrap();

        // One flip in block 0, two flips in block 2
        for pos in [4, 16, 17] {
            let bit = frame.bits[pos];
            frame.bits.set(pos, !bit);
        }

        let (_, outcomes) = framer.frame_decode(&frame).unwrap();
        assert_eq!(
            outcomes,
            vec![
                BlockOutcome::Corrected(5),
                BlockOutcome::Clean,
                BlockOutcome::Uncorrectable
            ]
        );
    }

    #[test]
    fn test_decode_is_deterministic() {
        let framer = SegmentFramer::new(HammingCode::standard_7_4());
        let segment = parse("1011 0110 1110 0001 1").unwrap();
        let mut frame = framer.frame_encode(&segment).unwrap();

        // A single, a double and a triple error in three different blocks
        for pos in [2, 7, 8, 15, 16, 17] {
            let bit = frame.bits[pos];
            frame.bits.set(pos, !bit);
        }

        let first = framer.frame_decode(&frame).unwrap();
        for _ in 0..10 {
            assert_eq!(framer.frame_decode(&frame).unwrap(), first);
        }
        assert_eq!(first.0.len(), segment.len());
        assert_eq!(first.1[0], BlockOutcome::Corrected(3));
        assert_eq!(first.1[4], BlockOutcome::Clean);
    }

    #[test]
    fn test_malformed_frames() {
        let framer = SegmentFramer::new(HammingCode::standard_7_4());
        let frame = Frame {
            bits: parse("011001").unwrap(),
            padding: 0,
        };
        assert!(matches!(
            framer.frame_decode(&frame),
            Err(Error::InvalidInput(_))
        ));

        let frame = Frame {
            bits: parse("0110011").unwrap(),
            padding: 4,
        };
        assert!(matches!(
            framer.frame_decode(&frame),
            Err(Error::InvalidInput(_))
        ));
    }
}

//! Bit sequence helpers.
//!
//! Segments, frames and error masks are all `BitVec<u8, Msb0>`: bit 0 is the
//! most significant bit of the first byte, which is the order a transport
//! layer sees when it turns a byte payload into a bit string.

use crate::error::{Error, Result};
use bitvec::prelude::*;

/// Owned bit sequence used for segments, frames and masks
pub type Bits = BitVec<u8, Msb0>;

/// Borrowed bit sequence
pub type BitsRef = BitSlice<u8, Msb0>;

/// Expands bytes into bits, most significant bit first.
pub fn from_bytes(bytes: &[u8]) -> Bits {
    bytes.view_bits::<Msb0>().to_bitvec()
}

/// Packs bits into bytes, most significant bit first.
///
/// A trailing partial byte is right-padded with zero bits.
pub fn to_bytes(bits: &BitsRef) -> Vec<u8> {
    let mut packed = Bits::with_capacity(bits.len());
    packed.extend_from_bitslice(bits);
    packed.set_uninitialized(false);
    packed.into_vec()
}

/// Parses a string of `0` and `1` characters. Whitespace is ignored so that
/// long segments can be written in groups.
///
/// # Errors
///
/// Returns `Error::InvalidInput` on any other character.
pub fn parse(text: &str) -> Result<Bits> {
    let mut bits = Bits::with_capacity(text.len());
    for (idx, ch) in text.chars().enumerate() {
        match ch {
            '0' => bits.push(false),
            '1' => bits.push(true),
            c if c.is_whitespace() => {}
            other => {
                return Err(Error::InvalidInput(format!(
                    "unexpected character {:?} at offset {} in bit string",
                    other, idx
                )))
            }
        }
    }
    Ok(bits)
}

/// Renders bits as a `0`/`1` string.
pub fn to_bit_string(bits: &BitsRef) -> String {
    bits.iter().map(|b| if *b { '1' } else { '0' }).collect()
}

/// Indices at which `original` and `received` differ.
///
/// When the lengths differ, every index past the shorter sequence counts as
/// a difference.
pub fn difference_positions(original: &BitsRef, received: &BitsRef) -> Vec<usize> {
    let common = original.len().min(received.len());
    let longest = original.len().max(received.len());

    original
        .iter()
        .by_vals()
        .zip(received.iter().by_vals())
        .enumerate()
        .filter(|(_, (a, b))| a != b)
        .map(|(idx, _)| idx)
        .chain(common..longest)
        .collect()
}

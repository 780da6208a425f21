#![doc = r#"
Variable-length quantities

Delta times and meta/sysex lengths in a MIDI file are stored as
variable-length quantities: 7 bits per byte, most significant group
first, with the high bit of every byte except the last set.

```text
0x00000000  00
0x00000080  81 00
0x00003FFF  FF 7F
0x0FFFFFFF  FF FF FF 7F
```

At most four bytes are allowed, so [`MAX_VALUE`] is `0x0FFFFFFF`.
"#]

use crate::OutOfRange;
use alloc::vec::Vec;
use thiserror::Error;

/// The largest value representable in four variable-length bytes.
pub const MAX_VALUE: u32 = 0x0FFF_FFFF;

/// An error while decoding a variable-length quantity
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VarLenError {
    /// The stream ended mid-quantity, or the fourth byte still had its continuation bit
    #[error("Variable-length quantity is truncated")]
    TruncatedStream,
}

/// Decode a quantity starting at `offset`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode(bytes: &[u8], offset: usize) -> Result<(u32, usize), VarLenError> {
    let rest = bytes.get(offset..).ok_or(VarLenError::TruncatedStream)?;
    let mut value = 0u32;
    for (i, byte) in rest.iter().take(4).enumerate() {
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(VarLenError::TruncatedStream)
}

/// The number of bytes `value` occupies once encoded.
///
/// Only meaningful for values up to [`MAX_VALUE`].
pub const fn encoded_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        _ => 4,
    }
}

/// Append the encoding of `value` to `out`.
///
/// Fails if `value` is larger than [`MAX_VALUE`].
pub fn encode_into(value: u32, out: &mut Vec<u8>) -> Result<(), OutOfRange> {
    if value > MAX_VALUE {
        return Err(OutOfRange::new(value as u64, MAX_VALUE as u64));
    }
    let len = encoded_len(value);
    for group in (0..len).rev() {
        let bits = ((value >> (7 * group)) & 0x7F) as u8;
        out.push(if group == 0 { bits } else { bits | 0x80 });
    }
    Ok(())
}

/// Encode `value` into a fresh buffer.
pub fn encode(value: u32) -> Result<Vec<u8>, OutOfRange> {
    let mut out = Vec::with_capacity(encoded_len(value));
    encode_into(value, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VECTORS: &[(u32, &[u8])] = &[
        (0x00, &[0x00]),
        (0x40, &[0x40]),
        (0x7F, &[0x7F]),
        (0x80, &[0x81, 0x00]),
        (0x2000, &[0xC0, 0x00]),
        (0x3FFF, &[0xFF, 0x7F]),
        (0x4000, &[0x81, 0x80, 0x00]),
        (0x10_0000, &[0xC0, 0x80, 0x00]),
        (0x1F_FFFF, &[0xFF, 0xFF, 0x7F]),
        (0x20_0000, &[0x81, 0x80, 0x80, 0x00]),
        (0x0800_0000, &[0xC0, 0x80, 0x80, 0x00]),
        (0x0FFF_FFFF, &[0xFF, 0xFF, 0xFF, 0x7F]),
    ];

    #[test]
    fn known_encodings() {
        for (value, bytes) in VECTORS {
            assert_eq!(encode(*value).unwrap(), bytes.to_vec(), "encoding {value:#x}");
            assert_eq!(decode(bytes, 0), Ok((*value, bytes.len())));
        }
    }

    #[test]
    fn decode_at_offset_ignores_trailing_bytes() {
        let bytes = [0xAA, 0x81, 0x00, 0x90, 0x3C];
        assert_eq!(decode(&bytes, 1), Ok((0x80, 2)));
    }

    #[test]
    fn decode_truncated() {
        assert_eq!(decode(&[0x81], 0), Err(VarLenError::TruncatedStream));
        assert_eq!(decode(&[], 0), Err(VarLenError::TruncatedStream));
        assert_eq!(decode(&[0x00], 4), Err(VarLenError::TruncatedStream));
    }

    #[test]
    fn decode_rejects_fifth_byte() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x7F];
        assert_eq!(decode(&bytes, 0), Err(VarLenError::TruncatedStream));
    }

    #[test]
    fn encode_rejects_large_values() {
        assert_eq!(
            encode(MAX_VALUE + 1),
            Err(OutOfRange::new((MAX_VALUE + 1) as u64, MAX_VALUE as u64))
        );
        assert!(encode(u32::MAX).is_err());
    }

    #[test]
    fn round_trip_across_range() {
        let boundaries = [0x7F, 0x80, 0x3FFF, 0x4000, 0x1F_FFFF, 0x20_0000, MAX_VALUE];
        let strided = (0..=MAX_VALUE).step_by(4099);
        for value in strided.chain(boundaries) {
            let bytes = encode(value).unwrap();
            assert_eq!(bytes.len(), encoded_len(value));
            assert_eq!(decode(&bytes, 0), Ok((value, bytes.len())));
        }
    }
}

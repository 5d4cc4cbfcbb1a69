//! Word-level packing and diff-level encode/decode.

use std::io::{Read, Write};

use tessera_core::{CellDiff, CellState, Coord};

use crate::error::WireError;
use crate::{COL_SHIFT, COORD_MASK, MAX_DIMENSION, MAX_STATES, ROW_SHIFT, STATE_MASK};

// ── Words ───────────────────────────────────────────────────────

/// Pack one changed cell into a wire word.
pub fn pack(at: Coord, value: CellState) -> Result<i32, WireError> {
    if at.row >= MAX_DIMENSION || at.col >= MAX_DIMENSION {
        return Err(WireError::CoordTooLarge { coord: at });
    }
    if value >= MAX_STATES {
        return Err(WireError::StateTooLarge { coord: at, value });
    }
    let word = (at.row << ROW_SHIFT) | (at.col << COL_SHIFT) | value;
    // Rows of 256 and above set the sign bit; the bit pattern is what matters.
    Ok(word as i32)
}

/// Unpack a wire word. Every 32-bit pattern decodes to some cell.
pub fn unpack(word: i32) -> (Coord, CellState) {
    let bits = word as u32;
    let row = (bits >> ROW_SHIFT) & COORD_MASK;
    let col = (bits >> COL_SHIFT) & COORD_MASK;
    (Coord::new(row, col), bits & STATE_MASK)
}

// ── Diffs ───────────────────────────────────────────────────────

/// Encode a diff, preserving its iteration order.
///
/// Fails on the first cell that does not fit; nothing is partially
/// returned.
pub fn encode_diff(diff: &CellDiff) -> Result<Vec<i32>, WireError> {
    diff.iter().map(|(&at, &value)| pack(at, value)).collect()
}

/// Decode a sequence of words. A later word for the same cell wins.
pub fn decode_diff(words: &[i32]) -> CellDiff {
    let mut diff = CellDiff::with_capacity(words.len());
    for &word in words {
        let (at, value) = unpack(word);
        diff.insert(at, value);
    }
    diff
}

// ── Framing ─────────────────────────────────────────────────────

/// Write `words` as a little-endian `u32` count followed by
/// little-endian `i32` words.
pub fn write_frame(w: &mut dyn Write, words: &[i32]) -> Result<(), WireError> {
    let count = u32::try_from(words.len()).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "frame too long")
    })?;
    w.write_all(&count.to_le_bytes())?;
    for word in words {
        w.write_all(&word.to_le_bytes())?;
    }
    Ok(())
}

/// Read one frame written by [`write_frame`].
pub fn read_frame(r: &mut dyn Read) -> Result<Vec<i32>, WireError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    let count = u32::from_le_bytes(buf) as usize;
    let mut words = Vec::with_capacity(count.min(1 << 16));
    for _ in 0..count {
        r.read_exact(&mut buf)?;
        words.push(i32::from_le_bytes(buf));
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_layout() {
        assert_eq!(pack(Coord::new(0, 0), 0).unwrap(), 0);
        assert_eq!(pack(Coord::new(0, 0), 5).unwrap(), 5);
        assert_eq!(pack(Coord::new(0, 1), 0).unwrap(), 1 << 14);
        assert_eq!(pack(Coord::new(1, 0), 0).unwrap(), 1 << 23);
        assert_eq!(pack(Coord::new(3, 7), 2).unwrap(), (3 << 23) | (7 << 14) | 2);
    }

    #[test]
    fn high_rows_use_sign_bit() {
        let word = pack(Coord::new(511, 511), STATE_MASK).unwrap();
        assert_eq!(word, -1);
        assert_eq!(unpack(word), (Coord::new(511, 511), STATE_MASK));
        assert!(pack(Coord::new(256, 0), 0).unwrap() < 0);
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            pack(Coord::new(512, 0), 0),
            Err(WireError::CoordTooLarge { .. })
        ));
        assert!(matches!(
            pack(Coord::new(0, 512), 0),
            Err(WireError::CoordTooLarge { .. })
        ));
        assert!(matches!(
            pack(Coord::new(0, 0), MAX_STATES),
            Err(WireError::StateTooLarge { value: 16384, .. })
        ));
    }

    #[test]
    fn decode_last_word_wins() {
        let a = pack(Coord::new(2, 2), 1).unwrap();
        let b = pack(Coord::new(2, 2), 3).unwrap();
        let diff = decode_diff(&[a, b]);
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[&Coord::new(2, 2)], 3);
    }

    #[test]
    fn frame_through_buffer() {
        let words = vec![0, -1, 1 << 23, 42];
        let mut buf = Vec::new();
        write_frame(&mut buf, &words).unwrap();
        assert_eq!(buf.len(), 4 + 4 * words.len());
        let read = read_frame(&mut buf.as_slice()).unwrap();
        assert_eq!(read, words);
    }

    #[test]
    fn truncated_frame_is_io_error() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &[1, 2, 3]).unwrap();
        buf.truncate(9);
        assert!(matches!(read_frame(&mut buf.as_slice()), Err(WireError::Io(_))));
    }

    proptest! {
        #[test]
        fn unpack_inverts_pack(row in 0u32..512, col in 0u32..512, value in 0u32..16384) {
            let word = pack(Coord::new(row, col), value).unwrap();
            prop_assert_eq!(unpack(word), (Coord::new(row, col), value));
        }

        #[test]
        fn pack_inverts_unpack(word in any::<i32>()) {
            let (at, value) = unpack(word);
            prop_assert_eq!(pack(at, value).unwrap(), word);
        }
    }
}

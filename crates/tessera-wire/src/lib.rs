//! Packed diff encoding for exchanging cell changes with a peer.
//!
//! Each changed cell travels as one signed 32-bit word:
//!
//! ```text
//!  31        23 22        14 13                 0
//! +------------+------------+--------------------+
//! |  row (9)   |  col (9)   |     state (14)     |
//! +------------+------------+--------------------+
//! ```
//!
//! The layout bounds grids to [`MAX_DIMENSION`] cells per axis and
//! alphabets to [`MAX_STATES`] states. Encoding is a pure transform
//! applied at the transport boundary; the engine never sees it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod codec;
pub mod error;

pub use codec::{decode_diff, encode_diff, pack, read_frame, unpack, write_frame};
pub use error::WireError;

/// Bit offset of the row field.
pub const ROW_SHIFT: u32 = 23;
/// Bit offset of the column field.
pub const COL_SHIFT: u32 = 14;
/// Mask for a 9-bit coordinate after shifting down.
pub const COORD_MASK: u32 = 0x1ff;
/// Mask for the 14-bit state field.
pub const STATE_MASK: u32 = 0x3fff;
/// Largest grid side length the encoding can address.
pub const MAX_DIMENSION: u32 = COORD_MASK + 1;
/// Largest state alphabet the encoding can carry.
pub const MAX_STATES: u32 = STATE_MASK + 1;

//! Frame and bit addresses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of 32-bit words per configuration frame in 7-series devices.
pub const FRAME_WORD_COUNT: u32 = 101;

/// Number of bits in a configuration word.
pub const WORD_BITS: u32 = 32;

/// An opaque frame address identifying a single configuration frame.
///
/// Frame addresses are ordered so that frames are always visited in a
/// deterministic, sorted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FrameAddress(u32);

impl FrameAddress {
    /// Creates a new frame address from a raw value.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value of this frame address.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns the frame `offset` frames after this one.
    pub fn offset(self, offset: u32) -> Self {
        Self(self.0.wrapping_add(offset))
    }
}

impl fmt::Display for FrameAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// The coordinate of one configuration bit: frame, word within the frame,
/// and bit within the word.
///
/// Ordering is lexicographic over `(frame, word, bit)`, which is also the
/// order bits appear in a configuration frame dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BitAddress {
    /// The frame containing this bit.
    pub frame: FrameAddress,
    /// The 32-bit word index within the frame.
    pub word: u32,
    /// The bit offset within the word (0..32).
    pub bit: u32,
}

impl BitAddress {
    /// Creates a bit address from its three coordinates.
    pub fn new(frame: FrameAddress, word: u32, bit: u32) -> Self {
        Self { frame, word, bit }
    }

    /// Creates a bit address from a frame and a bit index counted from the
    /// start of the frame.
    pub fn from_frame_bit(frame: FrameAddress, frame_bit: u32) -> Self {
        Self {
            frame,
            word: frame_bit / WORD_BITS,
            bit: frame_bit % WORD_BITS,
        }
    }

    /// Returns the bit index counted from the start of the frame.
    pub fn frame_bit(self) -> u32 {
        self.word * WORD_BITS + self.bit
    }
}

/// Formats as `FFFFFFFF_WWW_BB`, the spelling used for unknown-bit reports.
impl fmt::Display for BitAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}_{:03}_{:02}", self.frame.as_raw(), self.word, self.bit)
    }
}

//! The loaded, read-only configuration bit state.

use crate::address::{BitAddress, FrameAddress};
use std::collections::{BTreeMap, BTreeSet};

/// The set bits and occupied words of one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FrameBits {
    /// Word indices that hold at least one set bit.
    words: BTreeSet<u32>,
    /// Set bits, indexed from the start of the frame.
    bits: BTreeSet<u32>,
}

/// A sparse snapshot of a device configuration.
///
/// Maps every [`BitAddress`] to a boolean: addresses present in the state are
/// set, everything else is clear. A `BitState` is built once (by the loader or
/// by collecting an iterator of addresses) and is never mutated afterwards, so
/// it can be shared freely between disassembly workers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitState {
    frames: BTreeMap<FrameAddress, FrameBits>,
    set_count: usize,
}

impl BitState {
    /// Creates an empty state in which every bit is clear.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, addr: BitAddress) {
        let frame = self.frames.entry(addr.frame).or_default();
        if frame.bits.insert(addr.frame_bit()) {
            frame.words.insert(addr.word);
            self.set_count += 1;
        }
    }

    /// Returns whether the bit at `addr` is set.
    pub fn is_set(&self, addr: BitAddress) -> bool {
        self.frames
            .get(&addr.frame)
            .is_some_and(|f| f.bits.contains(&addr.frame_bit()))
    }

    /// Returns whether any word in `[first_word, first_word + count)` of the
    /// frame holds a set bit.
    pub fn window_has_data(&self, frame: FrameAddress, first_word: u32, count: u32) -> bool {
        let Some(f) = self.frames.get(&frame) else {
            return false;
        };
        if count == 0 {
            return false;
        }
        f.words
            .range(first_word..first_word.saturating_add(count))
            .next()
            .is_some()
    }

    /// Returns the frames that hold at least one set bit, in ascending order.
    pub fn frames(&self) -> impl Iterator<Item = FrameAddress> + '_ {
        self.frames.keys().copied()
    }

    /// Returns every set bit in ascending address order.
    pub fn set_bits(&self) -> impl Iterator<Item = BitAddress> + '_ {
        self.frames.iter().flat_map(|(&frame, f)| {
            f.bits
                .iter()
                .map(move |&b| BitAddress::from_frame_bit(frame, b))
        })
    }

    /// Returns the number of set bits.
    pub fn len(&self) -> usize {
        self.set_count
    }

    /// Returns whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.set_count == 0
    }

    /// Returns the number of frames holding at least one set bit.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FromIterator<BitAddress> for BitState {
    fn from_iter<I: IntoIterator<Item = BitAddress>>(iter: I) -> Self {
        let mut state = Self::new();
        for addr in iter {
            state.insert(addr);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(frame: u32, word: u32, bit: u32) -> BitAddress {
        BitAddress::new(FrameAddress::from_raw(frame), word, bit)
    }

    #[test]
    fn empty_state_is_all_clear() {
        let state = BitState::new();
        assert!(state.is_empty());
        assert_eq!(state.frame_count(), 0);
        assert!(!state.is_set(addr(3, 1, 5)));
        assert_eq!(state.set_bits().count(), 0);
    }

    #[test]
    fn collect_and_query() {
        let state: BitState = [addr(3, 1, 5), addr(3, 1, 6), addr(9, 0, 0)]
            .into_iter()
            .collect();
        assert_eq!(state.len(), 3);
        assert_eq!(state.frame_count(), 2);
        assert!(state.is_set(addr(3, 1, 5)));
        assert!(!state.is_set(addr(3, 1, 7)));
        assert!(!state.is_set(addr(4, 1, 5)));
    }

    #[test]
    fn duplicates_are_counted_once() {
        let state: BitState = [addr(3, 1, 5), addr(3, 1, 5)].into_iter().collect();
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn window_queries() {
        let state: BitState = [addr(3, 50, 1)].into_iter().collect();
        let frame = FrameAddress::from_raw(3);
        assert!(state.window_has_data(frame, 50, 1));
        assert!(!state.window_has_data(frame, 51, 1));
        assert!(state.window_has_data(frame, 49, 2));
        assert!(!state.window_has_data(frame, 51, 2));
        assert!(!state.window_has_data(frame, 50, 0));
        assert!(!state.window_has_data(FrameAddress::from_raw(4), 0, 101));
    }

    #[test]
    fn iteration_is_sorted() {
        let state: BitState = [addr(9, 0, 0), addr(3, 2, 0), addr(3, 1, 31)]
            .into_iter()
            .collect();
        let bits: Vec<_> = state.set_bits().collect();
        assert_eq!(bits, vec![addr(3, 1, 31), addr(3, 2, 0), addr(9, 0, 0)]);
        let frames: Vec<_> = state.frames().map(FrameAddress::as_raw).collect();
        assert_eq!(frames, vec![3, 9]);
    }
}

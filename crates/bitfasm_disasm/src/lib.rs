//! Bitstream-to-FASM disassembly.
//!
//! The stages run in a fixed order:
//!
//! 1. [`Disassembler`] matches every segbits feature of every candidate tile
//!    against a [`BitState`](bitfasm_bits::BitState), in parallel.
//! 2. [`merge_and_sort`] deduplicates the matches, drops zero-features using
//!    a [`ZeroFeatureClassifier`], and orders them by tile sort key.
//! 3. [`render`] writes the ordered list as FASM text.

#![warn(missing_docs)]

pub mod disassembler;
pub mod feature;
pub mod merge;
pub mod render;
pub mod zero;

pub use disassembler::{disassemble, Disassembler, Disassembly};
pub use feature::{Feature, FeatureRecord, FieldValue, MatchedBit};
pub use merge::{merge_and_sort, MergedFeatures};
pub use render::render;
pub use zero::ZeroFeatureClassifier;

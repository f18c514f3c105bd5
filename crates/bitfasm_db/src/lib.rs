//! Device database for bitstream disassembly.
//!
//! The database is the device-specific "instruction set" the disassembler
//! decodes against. It is loaded once from a directory in the
//! [Project X-Ray](https://github.com/f4pga/prjxray) layout and is read-only
//! afterwards, so any number of disassembly runs can share it without locking.
//!
//! # Database files
//!
//! - `tilegrid.json`: tile names, types, grid positions, and the frame
//!   window each tile's configuration bits live in
//! - `segbits_<type>.db` / `segbits_<type>.block_ram.db`: feature-to-bit
//!   mappings per tile type and configuration block
//!
//! The [`TileGrid`] answers `lookup_tile` and `sort_key`; the
//! [`SegmentBitIndex`] answers `rules_for` and `features_for`.

#![warn(missing_docs)]

pub mod db;
pub mod segbits;
pub mod tilegrid;

pub use db::Database;
pub use segbits::{
    FeatureBitRule, Polarity, SegBitsMap, SegmentBit, SegmentBitIndex, MAX_FEATURE_INDEX,
};
pub use tilegrid::{BlockType, SegmentRef, TileGrid, TileInfo, TileSegment, TileSortKey};

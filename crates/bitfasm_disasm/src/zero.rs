//! Zero-feature classification.
//!
//! A zero-feature is defined purely by clear bits, such as a flip-flop's
//! `ZINI` option. Every tile that is examined but does not set the
//! corresponding bits matches it, so it is normally left out of the output.

use crate::feature::FeatureRecord;
use bitfasm_common::BitfasmResult;
use bitfasm_db::{SegmentBitIndex, TileGrid};

/// Decides whether a matched feature is a zero-feature, consulting the
/// database for the feature's full rule set.
pub struct ZeroFeatureClassifier<'db> {
    grid: &'db TileGrid,
    index: &'db SegmentBitIndex,
}

impl<'db> ZeroFeatureClassifier<'db> {
    /// Creates a classifier over a tile grid and its segbits.
    pub fn new(grid: &'db TileGrid, index: &'db SegmentBitIndex) -> Self {
        Self { grid, index }
    }

    /// Returns whether the feature of `record` has no set-polarity rule.
    ///
    /// A record from the disassembler carries the rules it matched, which
    /// belong to the block it was decoded in, so those decide. A record
    /// without matched bits falls back to the database rules.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTile`](bitfasm_common::BitfasmError::UnknownTile) if
    /// the record's tile is not in the grid, or
    /// [`UnknownFeature`](bitfasm_common::BitfasmError::UnknownFeature) if
    /// the tile's type does not define the feature.
    pub fn is_zero(&self, record: &FeatureRecord) -> BitfasmResult<bool> {
        let tile = self.grid.lookup_tile(&record.feature.tile)?;
        let rules = self.index.rules_for(&tile.tile_type, &record.feature.feature)?;
        if !record.bits.is_empty() {
            return Ok(record.zero);
        }
        Ok(!rules.iter().any(|r| r.is_set()))
    }
}

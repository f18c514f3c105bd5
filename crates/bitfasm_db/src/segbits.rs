//! Parser and index for `segbits_*.db` files.
//!
//! Segbits files map tile features (LUT initialization bits, PIP enables,
//! flip-flop configuration, ...) to bit positions relative to the tile's
//! frame window.
//!
//! # Format
//!
//! ```text
//! CLBLL_L.SLICEL_X0.ALUT.INIT[00] 00_14 00_15
//! CLBLL_L.SLICEL_X0.AFF.ZRST !01_42
//! INT_L.NL1BEG1.SS2END0 28_13
//! ```
//!
//! Each bit entry has the format `[!]frame_bit` where `frame` is the frame
//! offset relative to the tile's base address and `bit` is the bit position
//! within the tile's word range. The `!` prefix marks a bit that must be clear
//! for the feature to hold.

use crate::tilegrid::BlockType;
use bitfasm_common::{BitfasmError, BitfasmResult};
use std::collections::{BTreeMap, HashMap};

/// Whether a rule requires its bit to be set or clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// The bit must be 1.
    Set,
    /// The bit must be 0 (or absent from the bit state).
    Clear,
}

/// A bit position relative to a tile's frame window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentBit {
    /// Frame offset relative to the tile's base address.
    pub frame_offset: u32,
    /// Bit position counted from the tile's first word in that frame.
    pub bit_position: u32,
}

/// One bit constraint of a feature definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureBitRule {
    /// The tile-relative bit the rule constrains.
    pub bit: SegmentBit,
    /// The state the bit must be in.
    pub polarity: Polarity,
}

impl FeatureBitRule {
    /// Returns whether the rule requires a set bit.
    pub fn is_set(&self) -> bool {
        self.polarity == Polarity::Set
    }
}

/// Features of one tile type and block, keyed by normalized feature path
/// (without the tile type prefix).
pub type SegBitsMap = BTreeMap<String, Vec<FeatureBitRule>>;

/// Parses a single bit specifier like "00_14" or "!01_42".
///
/// # Errors
///
/// Returns an error string if the format is invalid.
pub fn parse_bit_spec(spec: &str) -> Result<FeatureBitRule, String> {
    let (polarity, rest) = match spec.strip_prefix('!') {
        Some(s) => (Polarity::Clear, s),
        None => (Polarity::Set, spec),
    };

    let parts: Vec<&str> = rest.split('_').collect();
    if parts.len() != 2 {
        return Err(format!(
            "invalid bit spec '{spec}': expected format 'frame_bit' or '!frame_bit'"
        ));
    }

    let frame_offset = parts[0]
        .parse::<u32>()
        .map_err(|e| format!("invalid frame offset in '{spec}': {e}"))?;
    let bit_position = parts[1]
        .parse::<u32>()
        .map_err(|e| format!("invalid bit position in '{spec}': {e}"))?;

    Ok(FeatureBitRule {
        bit: SegmentBit {
            frame_offset,
            bit_position,
        },
        polarity,
    })
}

/// Largest trailing `[n]` index accepted in a feature path.
///
/// Block RAM initialization words, the widest fields, stop at 255.
pub const MAX_FEATURE_INDEX: u32 = 0xffff;

/// Normalizes a raw segbits feature name into a tile-relative feature path.
///
/// The leading tile type component is dropped and a trailing `[NN]` index is
/// rewritten without zero padding: `CLBLL_L.SLICEL_X0.ALUT.INIT[07]` becomes
/// `SLICEL_X0.ALUT.INIT[7]`.
///
/// # Errors
///
/// Returns an error string if the name has no path after the tile type or the
/// trailing index is not numeric or above [`MAX_FEATURE_INDEX`].
pub fn normalize_feature(raw: &str) -> Result<String, String> {
    let path = match raw.split_once('.') {
        Some((_, path)) if !path.is_empty() => path,
        _ => return Err(format!("feature '{raw}' has no path after the tile type")),
    };

    if let Some(stripped) = path.strip_suffix(']') {
        if let Some((base, index)) = stripped.rsplit_once('[') {
            let index = index
                .parse::<u32>()
                .map_err(|e| format!("invalid index in feature '{raw}': {e}"))?;
            if index > MAX_FEATURE_INDEX {
                return Err(format!(
                    "index {index} in feature '{raw}' exceeds {MAX_FEATURE_INDEX}"
                ));
            }
            return Ok(format!("{base}[{index}]"));
        }
    }
    Ok(path.to_string())
}

/// Parses a segbits database string into a [`SegBitsMap`].
///
/// Each line maps a feature name to one or more bit specifiers. Empty lines
/// and lines starting with `#` are skipped.
///
/// # Errors
///
/// Returns an error string naming the line if it has an invalid format, has
/// no bit specifiers, or repeats a feature.
pub fn parse_segbits(content: &str) -> Result<SegBitsMap, String> {
    let mut map = BTreeMap::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let raw_feature = parts
            .next()
            .ok_or_else(|| format!("line {}: empty feature name", line_no + 1))?;
        let feature =
            normalize_feature(raw_feature).map_err(|e| format!("line {}: {e}", line_no + 1))?;

        let mut rules = Vec::new();
        for bit_spec in parts {
            let rule =
                parse_bit_spec(bit_spec).map_err(|e| format!("line {}: {e}", line_no + 1))?;
            rules.push(rule);
        }

        if rules.is_empty() {
            return Err(format!(
                "line {}: feature '{raw_feature}' has no bit specifiers",
                line_no + 1
            ));
        }

        if map.insert(feature, rules).is_some() {
            return Err(format!(
                "line {}: duplicate feature '{raw_feature}'",
                line_no + 1
            ));
        }
    }

    Ok(map)
}

/// Returns the segbits file name for a tile type and block.
pub fn segbits_filename(tile_type: &str, block: BlockType) -> String {
    let tile_type = tile_type.to_ascii_lowercase();
    match block {
        BlockType::ClbIoClk => format!("segbits_{tile_type}.db"),
        BlockType::BlockRam => format!("segbits_{tile_type}.block_ram.db"),
        BlockType::CfgClb => format!("segbits_{tile_type}.cfg_clb.db"),
    }
}

/// Segbits of one tile type, across all blocks.
#[derive(Debug, Clone, Default)]
struct TileTypeSegbits {
    blocks: BTreeMap<BlockType, SegBitsMap>,
}

/// Read-only index from `(tile type, feature path)` to bit rules.
///
/// Rules are indexed by tile type once at load time; every tile instance of a
/// type shares the same table.
#[derive(Debug, Clone, Default)]
pub struct SegmentBitIndex {
    types: HashMap<String, TileTypeSegbits>,
}

impl SegmentBitIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the features of one tile type and block, replacing any earlier
    /// table for the same pair.
    pub fn insert(&mut self, tile_type: &str, block: BlockType, features: SegBitsMap) {
        self.types
            .entry(tile_type.to_string())
            .or_default()
            .blocks
            .insert(block, features);
    }

    /// Returns the rules defining a feature of a tile type.
    ///
    /// # Errors
    ///
    /// Returns [`BitfasmError::UnknownFeature`] if the tile type has no such
    /// feature in any block.
    pub fn rules_for(&self, tile_type: &str, feature: &str) -> BitfasmResult<&[FeatureBitRule]> {
        self.types
            .get(tile_type)
            .and_then(|t| t.blocks.values().find_map(|features| features.get(feature)))
            .map(Vec::as_slice)
            .ok_or_else(|| BitfasmError::unknown_feature(tile_type, feature))
    }

    /// Returns every feature path defined for a tile type, ordered by block
    /// then path. Unknown tile types have no features.
    pub fn features_for<'a>(&'a self, tile_type: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.types
            .get(tile_type)
            .into_iter()
            .flat_map(|t| t.blocks.values())
            .flat_map(|features| features.keys().map(String::as_str))
    }

    /// Returns the features of a tile type within one block, with their rules.
    pub fn features_in_block<'a>(
        &'a self,
        tile_type: &str,
        block: BlockType,
    ) -> impl Iterator<Item = (&'a str, &'a [FeatureBitRule])> + 'a {
        self.types
            .get(tile_type)
            .and_then(|t| t.blocks.get(&block))
            .into_iter()
            .flat_map(|features| features.iter().map(|(k, v)| (k.as_str(), v.as_slice())))
    }

    /// Returns whether segbits were loaded for the tile type in `block`.
    pub fn has_block(&self, tile_type: &str, block: BlockType) -> bool {
        self.types
            .get(tile_type)
            .is_some_and(|t| t.blocks.contains_key(&block))
    }

    /// Returns the number of tile types with loaded segbits.
    pub fn tile_type_count(&self) -> usize {
        self.types.len()
    }

    /// Returns the total number of feature definitions.
    pub fn feature_count(&self) -> usize {
        self.types
            .values()
            .flat_map(|t| t.blocks.values())
            .map(BTreeMap::len)
            .sum()
    }
}

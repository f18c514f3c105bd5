//! Decoded features and the intermediate records they come from.

use bitfasm_bits::BitAddress;
use bitfasm_db::Polarity;
use std::collections::BTreeSet;
use std::fmt;

/// The value of a multi-bit field, such as a LUT truth table.
///
/// Stored as the set of set bit indices so fields wider than 64 bits (block
/// RAM initialization words are 256 bits) need no special handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    width: u32,
    set_bits: BTreeSet<u32>,
}

impl FieldValue {
    /// Creates a field value of `width` bits with the given bits set.
    ///
    /// Indices at or above `width` widen the field to fit them.
    pub fn new(width: u32, set_bits: impl IntoIterator<Item = u32>) -> Self {
        let set_bits: BTreeSet<u32> = set_bits.into_iter().collect();
        let width = set_bits
            .last()
            .map_or(width, |&hi| width.max(hi.saturating_add(1)));
        Self { width, set_bits }
    }

    /// Returns the field width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns whether bit `index` is set.
    pub fn bit(&self, index: u32) -> bool {
        self.set_bits.contains(&index)
    }
}

/// Formats as a sized Verilog-style hex literal, e.g. `64'h8000000000000001`.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'h", self.width)?;
        let digits = self.width.div_ceil(4).max(1);
        for d in (0..digits).rev() {
            let nibble = (0..4)
                .filter(|i| self.bit(d * 4 + i))
                .fold(0u32, |acc, i| acc | (1 << i));
            let c = char::from_digit(nibble, 16).unwrap_or('0');
            write!(f, "{}", c.to_ascii_uppercase())?;
        }
        Ok(())
    }
}

/// A single FASM feature: one decoded configuration option of one tile.
///
/// Feature identity is `(tile, feature)`; the value is only present for
/// multi-bit fields folded into one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// The tile name (e.g., "CLBLL_L_X16Y149").
    pub tile: String,
    /// The feature path within the tile (e.g., `SLICEL_X0.ALUT.INIT[5]`).
    pub feature: String,
    /// Optional value for a multi-bit field.
    pub value: Option<FieldValue>,
}

impl Feature {
    /// Creates a new feature with no value.
    pub fn new(tile: &str, feature: &str) -> Self {
        Self {
            tile: tile.to_string(),
            feature: feature.to_string(),
            value: None,
        }
    }

    /// Creates a new feature with a field value.
    pub fn with_value(tile: &str, feature: &str, value: FieldValue) -> Self {
        Self {
            tile: tile.to_string(),
            feature: feature.to_string(),
            value: Some(value),
        }
    }

    /// Returns the `(tile, feature)` identity of this feature.
    pub fn identity(&self) -> (&str, &str) {
        (&self.tile, &self.feature)
    }

    /// Splits a trailing `[n]` index off the feature path.
    ///
    /// `LUT.INIT[5]` yields `("LUT.INIT", 5)`; paths without a numeric
    /// trailing index yield `None`.
    pub fn indexed(&self) -> Option<(&str, u32)> {
        let (base, index) = self.feature.strip_suffix(']')?.rsplit_once('[')?;
        Some((base, index.parse().ok()?))
    }

    /// Formats this feature as a FASM line (without the newline).
    pub fn to_fasm_line(&self) -> String {
        match &self.value {
            Some(v) => format!("{}.{} = {v}", self.tile, self.feature),
            None => format!("{}.{}", self.tile, self.feature),
        }
    }
}

/// One bit that took part in a feature match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedBit {
    /// The absolute address of the bit.
    pub address: BitAddress,
    /// The polarity the rule required (and the bit satisfied).
    pub polarity: Polarity,
}

/// A matched feature together with the evidence for the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    /// The decoded feature.
    pub feature: Feature,
    /// The type of the tile the feature was decoded in.
    pub tile_type: String,
    /// Every bit the feature's rules constrained, in rule order.
    pub bits: Vec<MatchedBit>,
    /// Whether none of the matched bits is set.
    pub zero: bool,
}

impl FeatureRecord {
    /// Builds a record, deriving the zero flag from the matched bits.
    pub fn new(feature: Feature, tile_type: &str, bits: Vec<MatchedBit>) -> Self {
        let zero = bits.iter().all(|b| b.polarity == Polarity::Clear);
        Self {
            feature,
            tile_type: tile_type.to_string(),
            bits,
            zero,
        }
    }

    /// Returns the addresses of the set bits that triggered the match.
    pub fn set_bits(&self) -> impl Iterator<Item = BitAddress> + '_ {
        self.bits
            .iter()
            .filter(|b| b.polarity == Polarity::Set)
            .map(|b| b.address)
    }
}

//! Diagnostic codes with category prefixes for structured identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Warning diagnostics about database gaps, prefixed with `W`.
    Warning,
    /// Informational notes about the decoded bitstream, prefixed with `N`.
    Note,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Warning => 'W',
            Category::Note => 'N',
        }
    }
}

/// A structured diagnostic code combining a category prefix and a number.
///
/// Displayed as the prefix followed by a zero-padded 3-digit number, e.g.
/// `W201` or `N302`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Segbits are missing for a tile type present in the bitstream.
    pub const MISSING_SEGBITS: Self = Self::new(Category::Warning, 201);
    /// A feature lookup failed and was downgraded to a warning.
    pub const UNKNOWN_FEATURE: Self = Self::new(Category::Warning, 202);
    /// A matched feature carried no set bits and was suppressed.
    pub const ZERO_FEATURE: Self = Self::new(Category::Note, 301);
    /// Set bits in a frame were not accounted for by any feature.
    pub const UNCONVERTED_BITS: Self = Self::new(Category::Note, 302);

    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefixes() {
        assert_eq!(Category::Warning.prefix(), 'W');
        assert_eq!(Category::Note.prefix(), 'N');
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", DiagnosticCode::MISSING_SEGBITS), "W201");
        assert_eq!(format!("{}", DiagnosticCode::UNCONVERTED_BITS), "N302");
        assert_eq!(format!("{}", DiagnosticCode::new(Category::Note, 7)), "N007");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::ZERO_FEATURE;
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}

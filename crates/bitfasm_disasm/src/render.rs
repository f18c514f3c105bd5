//! FASM (FPGA Assembly) text rendering.
//!
//! FASM is a simple text format where each line names one enabled feature of
//! the device configuration:
//!
//! ```text
//! CLBLL_L_X16Y149.SLICEL_X0.ALUT.INIT[63:0] = 64'h8000000000000001
//! CLBLL_L_X16Y149.SLICEL_X0.AFF.ZINI
//! INT_L_X16Y149.NL1BEG1.SS2END0
//! ```
//!
//! Canonical rendering folds the single-bit members of an indexed field
//! (`INIT[0]`, `INIT[63]`, ...) into one `INIT[63:0] = 64'h...` line.

use crate::feature::{Feature, FieldValue};
use bitfasm_db::MAX_FEATURE_INDEX;
use std::collections::HashMap;
use std::fmt::Write;

/// One output line before formatting.
enum Line<'a> {
    Plain(&'a Feature),
    Field {
        tile: &'a str,
        base: &'a str,
        indices: Vec<u32>,
    },
}

/// Renders an ordered feature list as FASM text.
///
/// Every line ends with `\n`; an empty list renders as an empty string. The
/// order of `features` is kept, with a folded field taking the position of
/// its first member.
pub fn render(features: &[Feature], canonical: bool) -> String {
    let mut output = String::new();
    if !canonical {
        for f in features {
            writeln!(output, "{}", f.to_fasm_line()).unwrap();
        }
        return output;
    }

    for line in fold_fields(features) {
        match line {
            Line::Plain(f) => writeln!(output, "{}", f.to_fasm_line()).unwrap(),
            Line::Field {
                tile,
                base,
                indices,
            } => {
                if let [index] = indices[..] {
                    writeln!(output, "{tile}.{base}[{index}]").unwrap();
                } else {
                    let value = FieldValue::new(0, indices);
                    let hi = value.width() - 1;
                    writeln!(output, "{tile}.{base}[{hi}:0] = {value}").unwrap();
                }
            }
        }
    }
    output
}

/// Groups indexed features of the same tile and base path.
///
/// Indices above [`MAX_FEATURE_INDEX`] are never folded.
fn fold_fields(features: &[Feature]) -> Vec<Line<'_>> {
    let mut lines = Vec::with_capacity(features.len());
    let mut fields: HashMap<(&str, &str), usize> = HashMap::new();

    for f in features {
        let foldable = f
            .indexed()
            .filter(|&(_, index)| f.value.is_none() && index <= MAX_FEATURE_INDEX);
        let Some((base, index)) = foldable else {
            lines.push(Line::Plain(f));
            continue;
        };
        match fields.get(&(f.tile.as_str(), base)) {
            Some(&pos) => {
                if let Line::Field { indices, .. } = &mut lines[pos] {
                    indices.push(index);
                }
            }
            None => {
                fields.insert((f.tile.as_str(), base), lines.len());
                lines.push(Line::Field {
                    tile: &f.tile,
                    base,
                    indices: vec![index],
                });
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(lines: &[(&str, &str)]) -> Vec<Feature> {
        lines.iter().map(|(t, f)| Feature::new(t, f)).collect()
    }

    #[test]
    fn empty_renders_empty_string() {
        assert_eq!(render(&[], false), "");
        assert_eq!(render(&[], true), "");
    }

    #[test]
    fn plain_lines_keep_order() {
        let fs = features(&[
            ("INT_L_X0Y1", "NL1BEG1.SS2END0"),
            ("CLBLL_L_X0Y0", "SLICEL_X0.AFF.ZINI"),
        ]);
        assert_eq!(
            render(&fs, false),
            "INT_L_X0Y1.NL1BEG1.SS2END0\nCLBLL_L_X0Y0.SLICEL_X0.AFF.ZINI\n"
        );
    }

    #[test]
    fn non_canonical_keeps_indexed_bits() {
        let fs = features(&[("CLB_X2Y3", "LUT.INIT[0]"), ("CLB_X2Y3", "LUT.INIT[5]")]);
        assert_eq!(
            render(&fs, false),
            "CLB_X2Y3.LUT.INIT[0]\nCLB_X2Y3.LUT.INIT[5]\n"
        );
    }

    #[test]
    fn canonical_folds_field() {
        let fs = features(&[
            ("CLB_X2Y3", "FF.ENABLE"),
            ("CLB_X2Y3", "LUT.INIT[0]"),
            ("CLB_X2Y3", "LUT.INIT[5]"),
            ("CLB_X2Y3", "ZZ"),
        ]);
        assert_eq!(
            render(&fs, true),
            "CLB_X2Y3.FF.ENABLE\nCLB_X2Y3.LUT.INIT[5:0] = 6'h21\nCLB_X2Y3.ZZ\n"
        );
    }

    #[test]
    fn canonical_single_member_stays_plain() {
        let fs = features(&[("CLB_X2Y3", "LUT.INIT[7]")]);
        assert_eq!(render(&fs, true), "CLB_X2Y3.LUT.INIT[7]\n");
    }

    #[test]
    fn canonical_does_not_fold_across_tiles() {
        let fs = features(&[
            ("CLB_X2Y4", "LUT.INIT[1]"),
            ("CLB_X2Y3", "LUT.INIT[0]"),
            ("CLB_X2Y4", "LUT.INIT[3]"),
        ]);
        assert_eq!(
            render(&fs, true),
            "CLB_X2Y4.LUT.INIT[3:0] = 4'hA\nCLB_X2Y3.LUT.INIT[0]\n"
        );
    }

    #[test]
    fn canonical_wide_field() {
        let fs = features(&[
            ("BRAM_L_X6Y0", "RAMB18_Y0.INIT_00[0]"),
            ("BRAM_L_X6Y0", "RAMB18_Y0.INIT_00[255]"),
        ]);
        let expected = format!(
            "BRAM_L_X6Y0.RAMB18_Y0.INIT_00[255:0] = 256'h8{}1\n",
            "0".repeat(62)
        );
        assert_eq!(render(&fs, true), expected);
    }

    #[test]
    fn canonical_leaves_oversized_index_unfolded() {
        let fs = features(&[
            ("CLB_X2Y3", "LUT.INIT[0]"),
            ("CLB_X2Y3", "LUT.INIT[4294967295]"),
        ]);
        assert_eq!(
            render(&fs, true),
            "CLB_X2Y3.LUT.INIT[0]\nCLB_X2Y3.LUT.INIT[4294967295]\n"
        );
    }

    #[test]
    fn valued_features_pass_through() {
        let fs = vec![Feature::with_value(
            "CLB_X2Y3",
            "LUT.INIT[0]",
            FieldValue::new(1, [0]),
        )];
        assert_eq!(render(&fs, true), "CLB_X2Y3.LUT.INIT[0] = 1'h1\n");
    }
}

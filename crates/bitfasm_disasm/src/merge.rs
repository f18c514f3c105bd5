//! Merging matched records into the final, ordered feature list.

use crate::feature::{Feature, FeatureRecord};
use crate::zero::ZeroFeatureClassifier;
use bitfasm_common::{BitfasmError, BitfasmResult};
use bitfasm_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use std::collections::HashSet;

/// The ordered output of [`merge_and_sort`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedFeatures {
    /// Features to emit, ordered by tile sort key then feature path.
    pub features: Vec<Feature>,
    /// Zero-features routed aside in verbose mode, in the same order.
    /// Always empty outside verbose mode.
    pub zero_features: Vec<Feature>,
}

/// Deduplicates, filters, and orders matched records.
///
/// Records are deduplicated by `(tile, feature)` keeping the first
/// occurrence. Zero-features are dropped, or in verbose mode moved to
/// [`MergedFeatures::zero_features`] with an `N301` note. The remaining
/// features are stable-sorted by `(sort_key(tile), feature)`, so identical
/// input always yields identical output.
///
/// In verbose mode a feature the database does not define is reported as
/// `W202` and kept; otherwise it is an error.
///
/// # Errors
///
/// Returns [`BitfasmError::UnknownTile`] if `sort_key` or the classifier
/// cannot resolve a tile, and [`BitfasmError::UnknownFeature`] outside
/// verbose mode.
pub fn merge_and_sort<K, F>(
    records: Vec<FeatureRecord>,
    classifier: &ZeroFeatureClassifier<'_>,
    sort_key: F,
    verbose: bool,
    sink: &DiagnosticSink,
) -> BitfasmResult<MergedFeatures>
where
    F: Fn(&str) -> BitfasmResult<K>,
    K: Ord,
{
    let first: Vec<bool> = {
        let mut seen: HashSet<(&str, &str)> = HashSet::with_capacity(records.len());
        records
            .iter()
            .map(|r| seen.insert(r.feature.identity()))
            .collect()
    };

    let mut features = Vec::new();
    let mut zero_features = Vec::new();

    for (record, first) in records.into_iter().zip(first) {
        if !first {
            log::debug!(
                "dropping duplicate {}.{}",
                record.feature.tile,
                record.feature.feature
            );
            continue;
        }

        let zero = match classifier.is_zero(&record) {
            Ok(zero) => zero,
            Err(BitfasmError::UnknownFeature { tile_type, feature }) if verbose => {
                sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::UNKNOWN_FEATURE,
                        format!("feature {feature} not defined for tile type {tile_type}"),
                    )
                    .at(record.feature.tile.clone()),
                );
                false
            }
            Err(e) => return Err(e),
        };

        if !zero {
            features.push(record.feature);
        } else if verbose {
            sink.emit(
                Diagnostic::note(
                    DiagnosticCode::ZERO_FEATURE,
                    format!("zero-feature {} suppressed", record.feature.feature),
                )
                .at(record.feature.tile.clone()),
            );
            zero_features.push(record.feature);
        }
    }

    Ok(MergedFeatures {
        features: sort_features(features, &sort_key)?,
        zero_features: sort_features(zero_features, &sort_key)?,
    })
}

fn sort_features<K, F>(features: Vec<Feature>, sort_key: &F) -> BitfasmResult<Vec<Feature>>
where
    F: Fn(&str) -> BitfasmResult<K>,
    K: Ord,
{
    let mut keyed = features
        .into_iter()
        .map(|f| -> BitfasmResult<(K, Feature)> { Ok((sort_key(&f.tile)?, f)) })
        .collect::<BitfasmResult<Vec<_>>>()?;
    keyed.sort_by(|(ka, a), (kb, b)| ka.cmp(kb).then_with(|| a.feature.cmp(&b.feature)));
    Ok(keyed.into_iter().map(|(_, f)| f).collect())
}

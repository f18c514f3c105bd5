//! Feature matching against a loaded bit state.
//!
//! Only tile segments that cover a frame with set bits inside the tile's word
//! window are examined. Each candidate `(tile, block)` pair is matched
//! independently against the read-only [`BitState`] and database, so the
//! candidates are decoded in parallel with rayon and collected back in
//! candidate order.

use crate::feature::{Feature, FeatureRecord, MatchedBit};
use bitfasm_bits::{BitAddress, BitState, FrameAddress};
use bitfasm_db::{
    BlockType, FeatureBitRule, SegmentBitIndex, SegmentRef, TileGrid, TileSegment,
};
use bitfasm_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// The result of matching every candidate tile.
#[derive(Debug, Clone, Default)]
pub struct Disassembly {
    /// Matched features, grouped by tile in candidate order.
    pub records: Vec<FeatureRecord>,
    /// Set bits that no matched feature accounts for, in address order.
    pub unconverted: Vec<BitAddress>,
}

/// Matches segbits features against a bit state.
pub struct Disassembler<'db> {
    grid: &'db TileGrid,
    index: &'db SegmentBitIndex,
    verbose: bool,
}

impl<'db> Disassembler<'db> {
    /// Creates a disassembler over a tile grid and its segbits.
    pub fn new(grid: &'db TileGrid, index: &'db SegmentBitIndex) -> Self {
        Self {
            grid,
            index,
            verbose: false,
        }
    }

    /// Enables reporting of tile types without segbits and of unconverted bits.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Returns the tile segments that may hold configuration, in order.
    ///
    /// A segment is a candidate when one of its frames has a set bit within
    /// the segment's word window. Each segment appears once.
    pub fn candidates(&self, bits: &BitState) -> Vec<SegmentRef> {
        let mut candidates = BTreeSet::new();
        for frame in bits.frames() {
            for &seg_ref in self.grid.segments_in_frame(frame) {
                if let Some(seg) = self.segment(seg_ref) {
                    if bits.window_has_data(frame, seg.offset, seg.words) {
                        candidates.insert(seg_ref);
                    }
                }
            }
        }
        candidates.into_iter().collect()
    }

    /// Decodes every feature whose rules are all satisfied by `bits`.
    ///
    /// In verbose mode, tile types with no segbits and set bits left
    /// unaccounted for are reported to `sink`.
    pub fn disassemble(&self, bits: &BitState, sink: &DiagnosticSink) -> Disassembly {
        let candidates = self.candidates(bits);
        log::debug!("{} candidate tile segments", candidates.len());

        let records: Vec<FeatureRecord> = candidates
            .par_iter()
            .map(|&seg_ref| self.match_segment(bits, seg_ref))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        let consumed: HashSet<BitAddress> =
            records.iter().flat_map(FeatureRecord::set_bits).collect();
        let unconverted: Vec<BitAddress> = bits
            .set_bits()
            .filter(|addr| !consumed.contains(addr))
            .collect();
        log::debug!(
            "{} features matched, {} set bits unconverted",
            records.len(),
            unconverted.len()
        );

        if self.verbose {
            self.report_missing_segbits(&candidates, sink);
            report_unconverted(&unconverted, sink);
        }

        Disassembly {
            records,
            unconverted,
        }
    }

    fn segment(&self, seg_ref: SegmentRef) -> Option<&'db TileSegment> {
        self.grid.tile(seg_ref.tile).segments.get(&seg_ref.block)
    }

    fn match_segment(&self, bits: &BitState, seg_ref: SegmentRef) -> Vec<FeatureRecord> {
        let tile = self.grid.tile(seg_ref.tile);
        let Some(seg) = self.segment(seg_ref) else {
            return Vec::new();
        };
        self.index
            .features_in_block(&tile.tile_type, seg_ref.block)
            .filter_map(|(path, rules)| {
                let matched = match_rules(bits, seg, rules)?;
                log::trace!("{}.{path} matched", tile.name);
                Some(FeatureRecord::new(
                    Feature::new(&tile.name, path),
                    &tile.tile_type,
                    matched,
                ))
            })
            .collect()
    }

    fn report_missing_segbits(&self, candidates: &[SegmentRef], sink: &DiagnosticSink) {
        let missing: BTreeSet<(&str, BlockType)> = candidates
            .iter()
            .map(|s| (self.grid.tile(s.tile).tile_type.as_str(), s.block))
            .filter(|&(tile_type, block)| !self.index.has_block(tile_type, block))
            .collect();
        for (tile_type, block) in missing {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::MISSING_SEGBITS,
                    format!("no {block} segbits for tile type {tile_type}"),
                )
                .with_note("its tiles hold set bits but cannot be decoded"),
            );
        }
    }
}

/// Returns the matched bits if every rule holds, `None` otherwise.
fn match_rules(
    bits: &BitState,
    seg: &TileSegment,
    rules: &[FeatureBitRule],
) -> Option<Vec<MatchedBit>> {
    rules
        .iter()
        .map(|rule| {
            let address = seg.resolve(rule.bit);
            (bits.is_set(address) == rule.is_set()).then_some(MatchedBit {
                address,
                polarity: rule.polarity,
            })
        })
        .collect()
}

fn report_unconverted(unconverted: &[BitAddress], sink: &DiagnosticSink) {
    let mut by_frame: BTreeMap<FrameAddress, Vec<BitAddress>> = BTreeMap::new();
    for &addr in unconverted {
        by_frame.entry(addr.frame).or_default().push(addr);
    }
    for (frame, addrs) in by_frame {
        let diag = addrs.iter().fold(
            Diagnostic::note(
                DiagnosticCode::UNCONVERTED_BITS,
                format!("{} set bits not converted to features", addrs.len()),
            )
            .at(format!("frame {frame}")),
            |diag, addr| diag.with_note(format!("unknown_bit {addr}")),
        );
        sink.emit(diag);
    }
}

/// Decodes `bits` against a grid and its segbits without diagnostics.
pub fn disassemble(
    bits: &BitState,
    grid: &TileGrid,
    index: &SegmentBitIndex,
) -> Vec<FeatureRecord> {
    Disassembler::new(grid, index)
        .disassemble(bits, &DiagnosticSink::new())
        .records
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bitfasm_db::segbits::parse_segbits;
    use bitfasm_diagnostics::Severity;

    /// Three tiles sharing frames 0..4: `CLB_X2Y3` in words 0..2, `INT_X2Y3`
    /// in words 2..4 and `CLB_X2Y4` in words 4..6. Only CLB has segbits.
    pub(crate) fn fixture() -> (TileGrid, SegmentBitIndex) {
        let grid = bitfasm_db::tilegrid::parse_tilegrid(
            r#"{
                "CLB_X2Y3": {
                    "bits": {"CLB_IO_CLK": {"baseaddr": "0x00000000", "frames": 4, "offset": 0, "words": 2}},
                    "grid_x": 2, "grid_y": 3, "type": "CLB"
                },
                "CLB_X2Y4": {
                    "bits": {"CLB_IO_CLK": {"baseaddr": "0x00000000", "frames": 4, "offset": 4, "words": 2}},
                    "grid_x": 2, "grid_y": 4, "type": "CLB"
                },
                "INT_X2Y3": {
                    "bits": {"CLB_IO_CLK": {"baseaddr": "0x00000000", "frames": 4, "offset": 2, "words": 2}},
                    "grid_x": 3, "grid_y": 3, "type": "INT"
                }
            }"#,
        )
        .unwrap();
        let mut index = SegmentBitIndex::new();
        index.insert(
            "CLB",
            BlockType::ClbIoClk,
            parse_segbits(
                "CLB.LUT.INIT[00] 03_37\n\
                 CLB.LUT.INIT[01] 03_38\n\
                 CLB.FF.ZINI !02_00\n\
                 CLB.FF.ENABLE 02_00 02_01\n",
            )
            .unwrap(),
        );
        (grid, index)
    }

    fn bit(frame: u32, word: u32, b: u32) -> BitAddress {
        BitAddress::new(FrameAddress::from_raw(frame), word, b)
    }

    fn paths(records: &[FeatureRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| format!("{}.{}", r.feature.tile, r.feature.feature))
            .collect()
    }

    #[test]
    fn lut_init_bit_decodes() {
        let (grid, index) = fixture();
        // frame 3, word 1, bit 5 is bit 37 of CLB_X2Y3's window.
        let bits: BitState = [bit(3, 1, 5)].into_iter().collect();
        let records = disassemble(&bits, &grid, &index);
        assert_eq!(
            paths(&records),
            vec!["CLB_X2Y3.FF.ZINI", "CLB_X2Y3.LUT.INIT[0]"]
        );
        let init = &records[1];
        assert_eq!(init.set_bits().collect::<Vec<_>>(), vec![bit(3, 1, 5)]);
        assert!(!init.zero);
    }

    #[test]
    fn empty_state_has_no_records() {
        let (grid, index) = fixture();
        let records = disassemble(&BitState::new(), &grid, &index);
        assert!(records.is_empty());
    }

    #[test]
    fn clear_rules_need_a_candidate() {
        let (grid, index) = fixture();
        // Data in CLB_X2Y4's window only; CLB_X2Y3 is not examined.
        let bits: BitState = [bit(2, 4, 7)].into_iter().collect();
        let records = disassemble(&bits, &grid, &index);
        assert_eq!(paths(&records), vec!["CLB_X2Y4.FF.ZINI"]);
    }

    #[test]
    fn zero_feature_matches_alongside_others() {
        let (grid, index) = fixture();
        let bits: BitState = [bit(3, 1, 5)].into_iter().collect();
        let mut records = Disassembler::new(&grid, &index)
            .disassemble(&bits, &DiagnosticSink::new())
            .records;
        records.sort_by(|a, b| a.feature.feature.cmp(&b.feature.feature));
        let zini = records.iter().find(|r| r.feature.feature == "FF.ZINI").unwrap();
        assert!(zini.zero);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn multi_bit_feature_requires_all_bits() {
        let (grid, index) = fixture();
        let partial: BitState = [bit(2, 0, 0)].into_iter().collect();
        let records = disassemble(&partial, &grid, &index);
        assert!(!paths(&records).contains(&"CLB_X2Y3.FF.ENABLE".to_string()));

        let full: BitState = [bit(2, 0, 0), bit(2, 0, 1)].into_iter().collect();
        let records = disassemble(&full, &grid, &index);
        assert!(paths(&records).contains(&"CLB_X2Y3.FF.ENABLE".to_string()));
        // ZINI requires bit 0 clear, so it no longer matches.
        assert!(!paths(&records).contains(&"CLB_X2Y3.FF.ZINI".to_string()));
    }

    #[test]
    fn bits_outside_word_window_are_ignored() {
        let (grid, index) = fixture();
        let disasm = Disassembler::new(&grid, &index);
        let bits: BitState = [bit(0, 50, 0)].into_iter().collect();
        assert!(disasm.candidates(&bits).is_empty());
    }

    #[test]
    fn candidates_are_unique_and_ordered() {
        let (grid, index) = fixture();
        let disasm = Disassembler::new(&grid, &index);
        let bits: BitState = [bit(0, 0, 1), bit(1, 0, 1), bit(3, 2, 0)].into_iter().collect();
        let candidates = disasm.candidates(&bits);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn deterministic_across_runs() {
        let (grid, index) = fixture();
        let bits: BitState = [bit(3, 1, 5), bit(3, 1, 6), bit(2, 4, 0), bit(2, 2, 9)]
            .into_iter()
            .collect();
        let first = disassemble(&bits, &grid, &index);
        for _ in 0..8 {
            assert_eq!(disassemble(&bits, &grid, &index), first);
        }
    }

    #[test]
    fn unconverted_bits_reported_in_verbose() {
        let (grid, index) = fixture();
        let bits: BitState = [bit(3, 1, 5), bit(3, 1, 9)].into_iter().collect();
        let sink = DiagnosticSink::new();
        let result = Disassembler::new(&grid, &index)
            .verbose(true)
            .disassemble(&bits, &sink);
        assert_eq!(result.unconverted, vec![bit(3, 1, 9)]);

        let diags = sink.take_all();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::UNCONVERTED_BITS);
        assert_eq!(diags[0].severity, Severity::Note);
        assert_eq!(diags[0].location.as_deref(), Some("frame 0x00000003"));
        assert_eq!(diags[0].notes, vec!["unknown_bit 00000003_001_09"]);
    }

    #[test]
    fn missing_segbits_reported_once_per_type() {
        let (grid, index) = fixture();
        let bits: BitState = [bit(0, 2, 0), bit(1, 3, 0)].into_iter().collect();
        let sink = DiagnosticSink::new();
        Disassembler::new(&grid, &index)
            .verbose(true)
            .disassemble(&bits, &sink);
        let missing: Vec<_> = sink
            .take_all()
            .into_iter()
            .filter(|d| d.code == DiagnosticCode::MISSING_SEGBITS)
            .collect();
        assert_eq!(missing.len(), 1);
        assert!(missing[0].message.contains("INT"));
    }

    #[test]
    fn missing_segbits_reported_per_block() {
        let grid = bitfasm_db::tilegrid::parse_tilegrid(
            r#"{
                "BRAM_X0Y0": {
                    "bits": {
                        "CLB_IO_CLK": {"baseaddr": "0x00000000", "frames": 2, "offset": 0, "words": 2},
                        "BLOCK_RAM": {"baseaddr": "0x00800000", "frames": 2, "offset": 0, "words": 2}
                    },
                    "grid_x": 0, "grid_y": 0, "type": "BRAM"
                }
            }"#,
        )
        .unwrap();
        let mut index = SegmentBitIndex::new();
        index.insert(
            "BRAM",
            BlockType::ClbIoClk,
            parse_segbits("BRAM.IN_USE 00_00\n").unwrap(),
        );

        let bits: BitState = [bit(0, 0, 0), bit(0x0080_0001, 1, 3)].into_iter().collect();
        let sink = DiagnosticSink::new();
        let result = Disassembler::new(&grid, &index)
            .verbose(true)
            .disassemble(&bits, &sink);
        assert_eq!(paths(&result.records), vec!["BRAM_X0Y0.IN_USE"]);

        let missing: Vec<_> = sink
            .take_all()
            .into_iter()
            .filter(|d| d.code == DiagnosticCode::MISSING_SEGBITS)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].message, "no BLOCK_RAM segbits for tile type BRAM");
    }

    #[test]
    fn quiet_mode_emits_nothing() {
        let (grid, index) = fixture();
        let bits: BitState = [bit(0, 2, 0), bit(3, 1, 9)].into_iter().collect();
        let sink = DiagnosticSink::new();
        let result = Disassembler::new(&grid, &index).disassemble(&bits, &sink);
        assert!(sink.is_empty());
        assert_eq!(result.unconverted.len(), 2);
    }
}

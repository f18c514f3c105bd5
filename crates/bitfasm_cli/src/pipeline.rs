//! The bit-dump to FASM pipeline shared by the binary and its tests.

use std::path::Path;

use bitfasm_bits::{load_bitdata_file, BitState};
use bitfasm_common::BitfasmResult;
use bitfasm_db::Database;
use bitfasm_diagnostics::{CommentRenderer, Diagnostic, DiagnosticRenderer, DiagnosticSink};
use bitfasm_disasm::{merge_and_sort, render, Disassembler, ZeroFeatureClassifier};

/// Output options for one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Report zero-features, unknown features, missing segbits and
    /// unconverted bits.
    pub verbose: bool,
    /// Fold multi-bit fields into single lines.
    pub canonical: bool,
    /// Append diagnostics to the FASM text as `#` comments.
    pub annotate: bool,
}

/// The result of a successful run.
#[derive(Debug)]
pub struct FasmRun {
    /// The FASM text.
    pub text: String,
    /// Diagnostics raised during the run. With `annotate` they are also
    /// part of `text`.
    pub diagnostics: Vec<Diagnostic>,
}

/// Loads the database and a bit dump, then disassembles the dump to FASM.
///
/// # Errors
///
/// Propagates database load failures, malformed bit dumps, and unknown
/// tiles or features (the latter only outside verbose mode).
pub fn bits_to_fasm(
    db_root: &Path,
    part: &str,
    bits_path: &Path,
    options: PipelineOptions,
) -> BitfasmResult<FasmRun> {
    let db = Database::load(db_root, part)?;
    let bits = load_bitdata_file(bits_path)?;

    let sink = DiagnosticSink::new();
    let mut text = decode(&db, &bits, options, &sink)?;
    let diagnostics = sink.take_all();
    if options.annotate {
        text.push_str(&CommentRenderer.render_all(&diagnostics));
    }
    Ok(FasmRun { text, diagnostics })
}

/// Disassembles a loaded bit state against a loaded database.
pub fn decode(
    db: &Database,
    bits: &BitState,
    options: PipelineOptions,
    sink: &DiagnosticSink,
) -> BitfasmResult<String> {
    let disassembly = Disassembler::new(&db.grid, &db.index)
        .verbose(options.verbose)
        .disassemble(bits, sink);

    let classifier = ZeroFeatureClassifier::new(&db.grid, &db.index);
    let merged = merge_and_sort(
        disassembly.records,
        &classifier,
        |tile| db.grid.sort_key(tile),
        options.verbose,
        sink,
    )?;
    log::info!(
        "{} features ({} zero-features suppressed)",
        merged.features.len(),
        merged.zero_features.len()
    );
    Ok(render(&merged.features, options.canonical))
}

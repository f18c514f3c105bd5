//! Parser for ASCII bit dumps written by the frame-extraction tool.
//!
//! # Format
//!
//! ```text
//! bit_00020500_000_17
//! bit_00020500_001_03
//! bit_0002051f_100_31
//! ```
//!
//! Each line names one set bit as `bit_<frame>_<word>_<bit>`: the frame
//! address in hexadecimal, then the word index and the bit offset in decimal.
//! Bits that are not listed are clear. Lines are order-independent, so the
//! loader makes a single pass and needs no backtracking.

use crate::address::{BitAddress, FrameAddress, FRAME_WORD_COUNT, WORD_BITS};
use crate::state::BitState;
use bitfasm_common::{BitfasmError, BitfasmResult};
use std::io::BufRead;
use std::path::Path;

/// Parses one bit-dump line like `bit_00020500_000_17` into a [`BitAddress`].
///
/// # Errors
///
/// Returns a description of the problem if the line does not have four
/// `_`-separated fields, a field is not numeric, or the word or bit index is
/// out of range.
pub fn parse_bit_line(line: &str) -> Result<BitAddress, String> {
    let parts: Vec<&str> = line.split('_').collect();
    if parts.len() != 4 {
        return Err(format!(
            "expected 'bit_<frame>_<word>_<bit>', found '{line}'"
        ));
    }
    if parts[0] != "bit" {
        return Err(format!("expected 'bit' prefix, found '{}'", parts[0]));
    }

    let frame = u32::from_str_radix(parts[1], 16)
        .map_err(|e| format!("invalid frame address '{}': {e}", parts[1]))?;
    let word = parts[2]
        .parse::<u32>()
        .map_err(|e| format!("invalid word index '{}': {e}", parts[2]))?;
    let bit = parts[3]
        .parse::<u32>()
        .map_err(|e| format!("invalid bit offset '{}': {e}", parts[3]))?;

    if word >= FRAME_WORD_COUNT {
        return Err(format!(
            "word index {word} out of range (frames have {FRAME_WORD_COUNT} words)"
        ));
    }
    if bit >= WORD_BITS {
        return Err(format!(
            "bit offset {bit} out of range (words have {WORD_BITS} bits)"
        ));
    }

    Ok(BitAddress::new(FrameAddress::from_raw(frame), word, bit))
}

/// Reads a bit dump from `reader` into a [`BitState`].
///
/// Blank lines are skipped and surrounding whitespace is ignored. The
/// `source_name` is only used to label errors.
///
/// # Errors
///
/// Returns [`BitfasmError::MalformedBitstream`] naming the first offending
/// line, or [`BitfasmError::Io`] if the reader fails.
pub fn load_bitdata<R: BufRead>(reader: R, source_name: &str) -> BitfasmResult<BitState> {
    let mut addrs = Vec::new();
    for (line_no, raw) in reader.split(b'\n').enumerate() {
        let raw = raw.map_err(|source| BitfasmError::Io {
            path: source_name.into(),
            source,
        })?;
        let line = std::str::from_utf8(&raw).map_err(|e| {
            BitfasmError::malformed(
                source_name,
                line_no + 1,
                format!("line is not valid UTF-8: {e}"),
            )
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let addr = parse_bit_line(line)
            .map_err(|message| BitfasmError::malformed(source_name, line_no + 1, message))?;
        addrs.push(addr);
    }

    let state: BitState = addrs.into_iter().collect();
    log::debug!(
        "loaded {} set bits in {} frames from {source_name}",
        state.len(),
        state.frame_count()
    );
    Ok(state)
}

/// Opens and reads a bit dump file.
///
/// # Errors
///
/// See [`load_bitdata`]; additionally fails with [`BitfasmError::Io`] if the
/// file cannot be opened.
pub fn load_bitdata_file(path: &Path) -> BitfasmResult<BitState> {
    let file = std::fs::File::open(path).map_err(|source| BitfasmError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_bitdata(std::io::BufReader::new(file), &path.display().to_string())
}

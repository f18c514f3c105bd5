//! Running the external frame-extraction tool.
//!
//! The bitstream container format is not parsed here; `bitread` from Project
//! X-Ray decodes it and writes the set bits as a text dump that
//! [`bitfasm_bits::load_bitdata`] reads.

use bitfasm_common::{BitfasmError, BitfasmResult};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// Builds the `bitread` command line.
///
/// `-z` skips frames without set bits and `-y` selects the
/// `bit_<frame>_<word>_<bit>` dump format.
pub fn bitread_args(
    part_yaml: &Path,
    bit_file: &Path,
    frame_range: Option<&str>,
    out: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--part_file".into(), part_yaml.into()];
    if let Some(range) = frame_range {
        args.push("-F".into());
        args.push(range.into());
    }
    args.push("-o".into());
    args.push(out.into());
    args.push("-z".into());
    args.push("-y".into());
    args.push(bit_file.into());
    args
}

/// Runs `tool` to dump the set bits of `bit_file` into `out`.
///
/// # Errors
///
/// Returns [`BitfasmError::ExtractionFailed`] if the tool cannot be started
/// or exits unsuccessfully, carrying the tool's stderr.
pub fn extract_bits(
    tool: &Path,
    part_yaml: &Path,
    bit_file: &Path,
    frame_range: Option<&str>,
    out: &Path,
) -> BitfasmResult<()> {
    let args = bitread_args(part_yaml, bit_file, frame_range, out);
    log::info!("running {} on {}", tool.display(), bit_file.display());
    log::debug!("{} {:?}", tool.display(), args);

    let output = Command::new(tool)
        .args(&args)
        .output()
        .map_err(|e| BitfasmError::ExtractionFailed {
            tool: tool.display().to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BitfasmError::ExtractionFailed {
            tool: tool.display().to_string(),
            message: format!("{}: {}", output.status, stderr.trim()),
        });
    }
    Ok(())
}

//! bit2fasm: converts a 7-series bitstream into FASM.
//!
//! Runs the Project X-Ray `bitread` tool to dump the set configuration bits,
//! then decodes them against the part's tile grid and segbits database and
//! prints one FASM feature per line.

#![warn(missing_docs)]

mod extract;
mod pipeline;

use std::path::{Path, PathBuf};
use std::process;

use bitfasm_config::{load_config, resolve, FileConfig, Overrides, CONFIG_FILE_NAME};
use bitfasm_db::Database;
use bitfasm_diagnostics::{Diagnostic, DiagnosticRenderer, TerminalRenderer};
use clap::{Parser, ValueEnum};

use crate::pipeline::{bits_to_fasm, PipelineOptions};

/// Convert an FPGA bitstream into FASM.
#[derive(Parser, Debug)]
#[command(name = "bit2fasm", version, about = "Convert a 7-series bitstream into FASM")]
pub struct Cli {
    /// Bitstream file to disassemble.
    #[arg(required_unless_present = "bits", conflicts_with = "bits")]
    pub bit_file: Option<PathBuf>,

    /// Database root for the device family (e.g., prjxray-db/artix7).
    #[arg(long, value_name = "DIR")]
    pub db_root: Option<PathBuf>,

    /// Part name (e.g., xc7a35tcsg324-1).
    #[arg(long)]
    pub part: Option<String>,

    /// Path to the bitread frame-extraction tool.
    #[arg(long, value_name = "PATH")]
    pub bitread: Option<PathBuf>,

    /// Only extract frames in this range (passed to bitread as -F).
    #[arg(long, value_name = "RANGE")]
    pub frame_range: Option<String>,

    /// Read an existing bit dump instead of running bitread.
    #[arg(long, value_name = "FILE")]
    pub bits: Option<PathBuf>,

    /// Report zero-features, unknown features and unconverted bits.
    #[arg(short, long)]
    pub verbose: bool,

    /// Fold multi-bit fields into single `[hi:0] = value` lines.
    #[arg(long)]
    pub canonical: bool,

    /// Append diagnostics to the FASM output as comments instead of stderr.
    #[arg(long)]
    pub annotate: bool,

    /// Path to a `bitfasm.toml` configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Control colored diagnostics.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Output format for diagnostics on stderr.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// One JSON object per line.
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Logs at `warn` by default and `info` with `--verbose`; `RUST_LOG` wins.
fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let file = load_file_config(cli.config.as_deref())?;
    let settings = resolve(&overrides(cli), &file, |name| std::env::var(name).ok())?;
    log::debug!("settings: {settings:?}");

    // Held until the end of the run; dropping it removes the dump.
    let mut extracted = None;
    let bits_path = match (&cli.bits, &cli.bit_file) {
        (Some(bits), _) => bits.clone(),
        (None, Some(bit_file)) => {
            let dump = tempfile::Builder::new()
                .prefix("bit2fasm-")
                .suffix(".bits")
                .tempfile()?;
            extract::extract_bits(
                &settings.bitread,
                &Database::part_yaml(&settings.db_root, &settings.part),
                bit_file,
                cli.frame_range.as_deref(),
                dump.path(),
            )?;
            extracted.insert(dump).path().to_path_buf()
        }
        (None, None) => return Err("no bitstream or bit dump given".into()),
    };

    let options = PipelineOptions {
        verbose: settings.verbose,
        canonical: settings.canonical,
        annotate: cli.annotate,
    };
    let output = bits_to_fasm(&settings.db_root, &settings.part, &bits_path, options)?;

    if !cli.annotate {
        report(&output.diagnostics, cli)?;
    }
    print!("{}", output.text);
    Ok(0)
}

/// Loads `--config`, or `bitfasm.toml` in the working directory if present.
fn load_file_config(path: Option<&Path>) -> Result<FileConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => {
            let default = Path::new(CONFIG_FILE_NAME);
            if default.is_file() {
                Ok(load_config(default)?)
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}

fn overrides(cli: &Cli) -> Overrides {
    Overrides {
        db_root: cli.db_root.clone(),
        part: cli.part.clone(),
        bitread: cli.bitread.clone(),
        verbose: cli.verbose.then_some(true),
        canonical: cli.canonical.then_some(true),
    }
}

fn report(diagnostics: &[Diagnostic], cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.format {
        ReportFormat::Text => {
            let color = match cli.color {
                ColorChoice::Auto => atty_is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            };
            eprint!("{}", TerminalRenderer::new(color).render_all(diagnostics));
        }
        ReportFormat::Json => {
            for diag in diagnostics {
                eprintln!("{}", serde_json::to_string(diag)?);
            }
        }
    }
    Ok(())
}

/// Rough terminal detection from the `TERM` variable.
fn atty_is_terminal() -> bool {
    std::env::var("TERM").is_ok()
}

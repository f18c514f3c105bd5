//! Merging command-line, environment, file and default settings.

use crate::error::ConfigError;
use crate::types::FileConfig;
use std::path::PathBuf;

/// Settings given on the command line. `None` defers to lower-priority
/// sources.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Database root directory.
    pub db_root: Option<PathBuf>,
    /// Part name.
    pub part: Option<String>,
    /// Frame-extraction tool path.
    pub bitread: Option<PathBuf>,
    /// Verbose reporting.
    pub verbose: Option<bool>,
    /// Canonical rendering.
    pub canonical: Option<bool>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Database root directory for the device family.
    pub db_root: PathBuf,
    /// Part name.
    pub part: String,
    /// Frame-extraction tool to run.
    pub bitread: PathBuf,
    /// Verbose reporting.
    pub verbose: bool,
    /// Canonical rendering.
    pub canonical: bool,
}

/// Resolves settings with priority overrides > environment > file > default.
///
/// `env` looks up an environment variable; empty values count as unset.
/// The database root comes from `XRAY_DATABASE_DIR/XRAY_DATABASE` (both must
/// be set), the part from `XRAY_PART`, and the tool from
/// `XRAY_TOOLS_DIR/bitread`. Without any source the tool is `bitread`,
/// found through `PATH`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] if no source provides the database
/// root or the part.
pub fn resolve<F>(
    overrides: &Overrides,
    file: &FileConfig,
    env: F,
) -> Result<ResolvedSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| env(name).filter(|v| !v.is_empty());

    let env_root = var("XRAY_DATABASE_DIR")
        .zip(var("XRAY_DATABASE"))
        .map(|(dir, database)| PathBuf::from(dir).join(database));
    let db_root = overrides
        .db_root
        .clone()
        .or(env_root)
        .or_else(|| file.database.root.clone())
        .ok_or_else(|| ConfigError::MissingField("database.root".to_string()))?;

    let part = overrides
        .part
        .clone()
        .or_else(|| var("XRAY_PART"))
        .or_else(|| file.database.part.clone())
        .ok_or_else(|| ConfigError::MissingField("database.part".to_string()))?;

    let bitread = overrides
        .bitread
        .clone()
        .or_else(|| var("XRAY_TOOLS_DIR").map(|dir| PathBuf::from(dir).join("bitread")))
        .or_else(|| file.tools.bitread.clone())
        .unwrap_or_else(|| PathBuf::from("bitread"));

    Ok(ResolvedSettings {
        db_root,
        part,
        bitread,
        verbose: overrides
            .verbose
            .or(file.output.verbose)
            .unwrap_or(false),
        canonical: overrides
            .canonical
            .or(file.output.canonical)
            .unwrap_or(false),
    })
}

//! Configuration types deserialized from `bitfasm.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// The contents of a `bitfasm.toml` file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Device database location.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// External tool locations.
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Output format defaults.
    #[serde(default)]
    pub output: OutputConfig,
}

/// The `[database]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// The database root for the device family (e.g., `prjxray-db/artix7`).
    pub root: Option<PathBuf>,
    /// The part name (e.g., "xc7a35tcsg324-1").
    pub part: Option<String>,
}

/// The `[tools]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Path to the frame-extraction tool.
    pub bitread: Option<PathBuf>,
}

/// The `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Fold multi-bit fields into single lines.
    pub canonical: Option<bool>,
    /// Report zero-features, unknown features and unconverted bits.
    pub verbose: Option<bool>,
}

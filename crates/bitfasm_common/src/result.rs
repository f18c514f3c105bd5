//! Common result and error types for the bitfasm pipeline.

use std::path::PathBuf;

/// The standard result type for fallible pipeline operations.
pub type BitfasmResult<T> = Result<T, BitfasmError>;

/// A fatal error raised by one of the disassembly stages.
///
/// All failures are deterministic functions of the bit dump and the device
/// database, so none of them is worth retrying. Each variant carries enough
/// context (file, line, tile or feature) for the user to act on it.
#[derive(Debug, thiserror::Error)]
pub enum BitfasmError {
    /// A line of the ASCII bit dump could not be parsed.
    #[error("malformed bitstream {source_name}:{line}: {message}")]
    MalformedBitstream {
        /// The name of the bit dump (usually its path).
        source_name: String,
        /// The 1-based line number of the offending line.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// A tile name is absent from the tile grid.
    #[error("unknown tile '{0}'")]
    UnknownTile(String),

    /// A tile type has no definition for the requested feature.
    #[error("unknown feature '{feature}' for tile type '{tile_type}'")]
    UnknownFeature {
        /// The tile type that was searched.
        tile_type: String,
        /// The feature path that was not found.
        feature: String,
    },

    /// A device database file is missing or corrupt.
    #[error("failed to load device database {}: {message}", path.display())]
    DatabaseLoadFailure {
        /// The database file or directory at fault.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// An I/O error unrelated to the database, such as reading the bit dump.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The external frame-extraction tool could not produce a bit dump.
    #[error("frame extraction with '{tool}' failed: {message}")]
    ExtractionFailed {
        /// The tool that was invoked.
        tool: String,
        /// The tool's diagnostic output or the spawn error.
        message: String,
    },
}

impl BitfasmError {
    /// Creates a [`BitfasmError::MalformedBitstream`] for the given line.
    pub fn malformed(source_name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedBitstream {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates a [`BitfasmError::DatabaseLoadFailure`] for the given path.
    pub fn database(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DatabaseLoadFailure {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a [`BitfasmError::UnknownFeature`].
    pub fn unknown_feature(tile_type: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::UnknownFeature {
            tile_type: tile_type.into(),
            feature: feature.into(),
        }
    }
}

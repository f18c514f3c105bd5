//! Configuration for the `bit2fasm` tool.
//!
//! Settings come from four places, highest priority first: command-line
//! flags, `XRAY_*` environment variables, an optional `bitfasm.toml`, and
//! built-in defaults. [`resolve`] merges them into [`ResolvedSettings`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use resolve::{resolve, Overrides, ResolvedSettings};
pub use types::*;

//! Shared foundational types used across the bitfasm disassembler.
//!
//! Every stage of the pipeline reports failures through [`BitfasmError`], so
//! the binary can surface one actionable message regardless of which stage
//! gave up.

#![warn(missing_docs)]

pub mod result;

pub use result::{BitfasmError, BitfasmResult};

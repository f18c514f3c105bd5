//! Diagnostic creation, severity management, and rendering.
//!
//! The disassembler reports everything that is not a fatal error through
//! structured [`Diagnostic`] messages: tile types without segbits, unknown
//! features downgraded in verbose mode, suppressed zero-features, and set bits
//! that no feature accounts for. The thread-safe [`DiagnosticSink`] accumulates
//! them over a run, and [`DiagnosticRenderer`]
//! implementations format them for the terminal or as FASM comments.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{CommentRenderer, DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;

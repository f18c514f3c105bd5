//! In-memory configuration bit space for 7-series style frame addressing.
//!
//! A configuration image is addressed by `(frame, word, bit)` triples. The
//! external frame-extraction tool writes one line per set bit; this crate
//! parses that dump into an immutable, ordered [`BitState`] that the
//! disassembler queries.

#![warn(missing_docs)]

pub mod address;
pub mod loader;
pub mod state;

pub use address::{BitAddress, FrameAddress, FRAME_WORD_COUNT, WORD_BITS};
pub use loader::{load_bitdata, load_bitdata_file, parse_bit_line};
pub use state::BitState;

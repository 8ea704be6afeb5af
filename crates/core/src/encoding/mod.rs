//! Byte-level encoding and the merge engine.
//!
//! - `byte_level`: GPT-2 byte to placeholder character alphabet
//! - `bpe`: rank-ordered pair merging over symbol lists

pub mod bpe;
pub mod byte_level;

pub use bpe::{apply_merges, Symbol, SymbolList};
pub use byte_level::{byte_char, encode_bytes, ByteEncoder, BYTE_TO_CHAR};

//! bbpe-core - byte-level BPE building blocks
//!
//! This crate provides the data structures and algorithms shared by every byte-level
//! BPE model family: vocabulary and merge table parsing, the GPT-2 byte alphabet,
//! special token splitting and the rank-based merge engine.
//!
//! # Example
//!
//! ```rust
//! use bbpe_core::BpeModel;
//!
//! let vocab = r#"{"<unk>": 0, "h": 1, "i": 2, "hi": 3}"#;
//! let merges = "#version: 0.2\nh i\n";
//! let model = BpeModel::load(vocab, merges, "<unk>", &[]).unwrap();
//!
//! assert_eq!(model.token_id("hi"), 3);
//! assert_eq!(model.token_id("zz"), 0);
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

pub mod core;
pub use core::{
    MergeMap, MergeRules, Pair, Segment, SpecialTokenMap, SpecialTokensConfig, Vocab, VocabR,
    Vocabulary,
};

pub mod encoding;
pub use encoding::{apply_merges, byte_char, encode_bytes, ByteEncoder, Symbol, SymbolList};

pub mod model;
pub use model::BpeModel;

//! Loading tokenizers from disk.
//!
//! This module reads HuggingFace-style `vocab.json` / `merges.txt` pairs and JSON
//! tokenizer configuration files.

pub mod load;

pub use load::TokenizerLoader;

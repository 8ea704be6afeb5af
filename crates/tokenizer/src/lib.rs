//! bbpe-tokenizer - GPT-2, RoBERTa and CLIP byte-level BPE tokenization
//!
//! This crate turns raw text into token ids, attention masks and character offsets
//! using a pre-trained byte-level BPE vocabulary and merge table.
//!
//! # Features
//!
//! - Family-specific behaviour (sequence wrapping, CLIP whitespace clean-up and
//!   lowercasing) selected by [`ModelFamily`]
//! - GPT-2 pre-tokenization scanner and special token splitting
//! - LRU chunk cache, call-scoped or caller-owned
//! - Character offsets and padded batch outputs
//!
//! # Example
//!
//! ```rust
//! use bbpe_tokenizer::{BpeTokenizer, ModelFamily, OutputOptions};
//!
//! let tokenizer = BpeTokenizer::builder()
//!     .vocab(r#"{"<unk>": 0, "<s>": 1, "</s>": 2, "<pad>": 3, "h": 4, "i": 5, "hi": 6}"#)
//!     .merges("#version: 0.2\nh i\n")
//!     .family(ModelFamily::Roberta)
//!     .build()?;
//!
//! let result = tokenizer.tokenize("hi", None, true)?;
//! assert_eq!(result.ids, vec![1, 6, 2]);
//!
//! let batch = tokenizer.compute(&["hi", "h"], OutputOptions::all())?;
//! assert_eq!(batch.ids_row(1), &[1, 4, 2]);
//! # Ok::<(), bbpe_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use bbpe_core::{BpeModel, Result, SpecialTokensConfig, TokenizerError};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{
    BatchEncoding, BpeTokenizer, ModelConfig, ModelFamily, Offset, OutputOptions,
    TokenizeResult, TokenizerBuilder, TokenizerConfig, MAX_PADDING_LENGTH,
};

// IO
pub mod io;
pub use io::TokenizerLoader;

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{Scanner, GPT2_PATTERN};

// Utilities
pub mod utils;
pub use utils::{CacheStats, ChunkCache};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

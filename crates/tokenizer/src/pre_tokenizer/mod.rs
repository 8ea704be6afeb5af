//! Pre-tokenization pipeline.
//!
//! This module provides the steps applied before BPE merging: CLIP whitespace
//! normalization and the GPT-2 chunk scanner.

pub mod normalize;
pub mod scanner;

pub use normalize::{clean_up_whitespace, is_all_space, is_unicode_space, lowercase};
pub use scanner::{Scanner, GPT2_PATTERN};

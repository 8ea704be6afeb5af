//! Vocabulary, merge table and special token data structures.

pub mod merges;
pub mod special;
pub mod vocab;

pub use merges::{MergeMap, MergeRules, Pair};
pub use special::{Segment, SpecialTokenMap};
pub use vocab::{SpecialTokensConfig, Vocab, VocabR, Vocabulary};

//! Merge rule management for BPE.
//!
//! This module provides data structures for storing and accessing BPE merge rules.
//! Merge rules are stored using token IDs rather than strings for fast comparison.

use crate::core::vocab::Vocabulary;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// A pair of token IDs that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, new_token_id).
///
/// The rank indicates the priority of this merge rule (lower rank = higher priority).
/// The new_token_id is the ID of the token created by merging this pair.
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// Collection of BPE merge rules with efficient lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeRules {
    /// Merge rules: pair -> (rank, new_token_id)
    pub merges: MergeMap,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `merges.txt` content against a vocabulary.
    ///
    /// Each non-blank line holds two whitespace-separated tokens; the first line may be
    /// a `#version` header. Ranks follow line order starting at 0. When the same pair is
    /// declared twice the earlier declaration wins.
    pub fn from_text(text: &str, vocab: &Vocabulary) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(TokenizerError::InvalidFormat(
                "merges shouldn't be empty".to_string(),
            ));
        }

        let mut rules = Self::new();
        let mut rank = 0u32;

        for (line_num, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line_num == 0 && line.starts_with("#version") {
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            let &[left, right] = parts.as_slice() else {
                return Err(TokenizerError::InvalidFormat(format!(
                    "invalid merge format at line {}: '{}'",
                    line_num + 1,
                    line
                )));
            };

            let lookup = |token: &str| {
                vocab.get_id(token).ok_or_else(|| {
                    TokenizerError::InvalidFormat(format!(
                        "unknown token {:?} in merges at line {}",
                        token,
                        line_num + 1
                    ))
                })
            };
            let pair = (lookup(left)?, lookup(right)?);
            let merged = lookup(format!("{}{}", left, right).as_str())?;

            rules.merges.entry(pair).or_insert((rank, merged));
            rank += 1;
        }

        Ok(rules)
    }

    /// Add a merge rule.
    ///
    /// # Arguments
    /// * `pair` - The pair of token IDs to merge
    /// * `rank` - The priority rank (lower = higher priority)
    /// * `new_token_id` - The ID of the token created by this merge
    pub fn add_merge(&mut self, pair: Pair, rank: u32, new_token_id: u32) {
        self.merges.insert(pair, (rank, new_token_id));
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns Some((rank, new_token_id)) if this pair should be merged,
    /// None otherwise.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, u32)> {
        self.merges.get(&pair).copied()
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::from_json(r#"{"h": 0, "e": 1, "l": 2, "o": 3, "he": 4, "ll": 5, "hell": 6}"#)
            .unwrap()
    }

    #[test]
    fn test_from_text_ranks_follow_line_order() {
        let rules = MergeRules::from_text("#version: 0.2\nh e\nl l\nhe ll\n", &vocab()).unwrap();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules.get((0, 1)), Some((0, 4)));
        assert_eq!(rules.get((2, 2)), Some((1, 5)));
        assert_eq!(rules.get((4, 5)), Some((2, 6)));
        assert_eq!(rules.get((3, 3)), None);
    }

    #[test]
    fn test_header_only_is_valid() {
        let rules = MergeRules::from_text("#version: 0.2\n", &vocab()).unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_duplicate_pair_keeps_first_rank() {
        let rules = MergeRules::from_text("l l\nh e\nl l\n", &vocab()).unwrap();
        assert_eq!(rules.get((2, 2)), Some((0, 5)));
        assert_eq!(rules.get((0, 1)), Some((1, 4)));
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let rules = MergeRules::from_text("h e\r\n\r\nl l\r\n", &vocab()).unwrap();
        assert_eq!(rules.get((2, 2)), Some((1, 5)));
    }

    #[test]
    fn test_malformed_merges() {
        let vocab = vocab();
        for text in ["", "\n\n", "h e x\n", "h\n", "h o\n", "x y\n"] {
            assert!(
                matches!(
                    MergeRules::from_text(text, &vocab),
                    Err(TokenizerError::InvalidFormat(_))
                ),
                "expected failure for {:?}",
                text
            );
        }
    }
}

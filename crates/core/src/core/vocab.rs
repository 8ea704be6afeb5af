//! Vocabulary storage and lookup.
//!
//! This module provides efficient vocabulary storage using AHashMap for fast lookups
//! and CompactString for memory-efficient string storage. Vocabularies are parsed from
//! the `vocab.json` object format (token string -> integer id).

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Reverse mapping: ID -> token string
pub type VocabR = AHashMap<u32, CompactString>;

/// Vocabulary with forward and reverse mappings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Forward mapping: token string -> ID
    pub vocab: Vocab,
    /// Reverse mapping: ID -> token string
    pub vocab_r: VocabR,
}

impl Vocabulary {
    /// Create a new empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new vocabulary with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vocab: Vocab::with_capacity(capacity),
            vocab_r: VocabR::with_capacity(capacity),
        }
    }

    /// Parse a vocabulary from a JSON object mapping token strings to ids.
    ///
    /// Fails with [`TokenizerError::InvalidFormat`] when the text is blank, is not a
    /// JSON object of non-negative integers, or assigns the same id twice.
    pub fn from_json(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(TokenizerError::InvalidFormat(
                "vocabulary shouldn't be empty".to_string(),
            ));
        }

        let entries: HashMap<String, u32> = serde_json::from_str(text)
            .map_err(|e| TokenizerError::InvalidFormat(format!("malformed vocabulary: {}", e)))?;

        let mut vocab = Self::with_capacity(entries.len());
        for (token, id) in entries {
            vocab.add_token_with_id(&token, id)?;
        }

        Ok(vocab)
    }

    /// Add a token at the next free id (`vocab_size()`).
    ///
    /// Returns the existing id if the token is already present, or
    /// [`TokenizerError::InvalidFormat`] when the id space is exhausted.
    pub fn add_token(&mut self, token: &str) -> Result<u32> {
        if let Some(id) = self.get_id(token) {
            return Ok(id);
        }

        let id = u32::try_from(self.vocab_size()).map_err(|_| {
            TokenizerError::InvalidFormat(format!("no free token id left for {:?}", token))
        })?;
        let token = CompactString::new(token);
        self.vocab_r.insert(id, token.clone());
        self.vocab.insert(token, id);

        Ok(id)
    }

    /// Add a token with a specific ID.
    ///
    /// Returns an error if the ID is already taken.
    pub fn add_token_with_id(&mut self, token: &str, id: u32) -> Result<()> {
        if let Some(existing) = self.vocab_r.get(&id) {
            return Err(TokenizerError::InvalidFormat(format!(
                "token id {} assigned to both {:?} and {:?}",
                id, existing, token
            )));
        }

        let token = CompactString::new(token);
        self.vocab_r.insert(id, token.clone());
        self.vocab.insert(token, id);

        Ok(())
    }

    /// Get the ID for a token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(&id).map(|s| s.as_str())
    }

    /// Number of distinct tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// Size of the id space: one past the largest assigned id.
    ///
    /// Every id this vocabulary hands out is strictly below this value.
    pub fn vocab_size(&self) -> usize {
        self.vocab_r
            .keys()
            .max()
            .map_or(0, |&max_id| max_id as usize + 1)
    }
}

/// Special token strings configured for a tokenizer.
///
/// `unk` is mandatory once resolved; the others depend on the model family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialTokensConfig {
    pub unk: Option<String>,
    pub bos: Option<String>,
    pub eos: Option<String>,
    pub pad: Option<String>,
    /// Extra strings matched verbatim and mapped straight to their ids
    pub additional: Vec<String>,
}

impl SpecialTokensConfig {
    /// All configured token strings, unk first, without duplicates.
    pub fn to_list(&self) -> Vec<String> {
        let mut list: Vec<String> = Vec::new();
        let named = [&self.unk, &self.bos, &self.eos, &self.pad];
        let tokens = named
            .into_iter()
            .flatten()
            .chain(self.additional.iter());

        for token in tokens {
            if !token.is_empty() && !list.contains(token) {
                list.push(token.clone());
            }
        }

        list
    }
}

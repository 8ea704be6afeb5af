//! Special token detection.
//!
//! Special tokens are matched verbatim before any scanning or merging so that strings
//! such as `<|endoftext|>` always map to a single id.

use crate::error::{Result, TokenizerError};
use aho_corasick::{AhoCorasick, MatchKind};

/// A piece of input text after special token splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Ordinary text, to be scanned and merged
    Text(&'a str),
    /// A special token occurrence
    Special { id: u32, text: &'a str },
}

/// Matcher over the configured special tokens.
#[derive(Debug, Clone)]
pub struct SpecialTokenMap {
    tokens: Vec<(String, u32)>,
    matcher: Option<AhoCorasick>,
}

impl SpecialTokenMap {
    /// Build a matcher from `(token, id)` pairs.
    ///
    /// Overlapping candidates resolve leftmost first, then longest.
    pub fn new(tokens: Vec<(String, u32)>) -> Result<Self> {
        let matcher = if tokens.is_empty() {
            None
        } else {
            let patterns: Vec<&str> = tokens.iter().map(|(t, _)| t.as_str()).collect();
            let matcher = AhoCorasick::builder()
                .match_kind(MatchKind::LeftmostLongest)
                .build(&patterns)
                .map_err(|e| {
                    TokenizerError::InvalidConfig(format!("special token matcher: {}", e))
                })?;
            Some(matcher)
        };

        Ok(Self { tokens, matcher })
    }

    /// Id of a special token string, if configured.
    pub fn get(&self, token: &str) -> Option<u32> {
        self.tokens
            .iter()
            .find(|(t, _)| t == token)
            .map(|&(_, id)| id)
    }

    /// Configured `(token, id)` pairs in priority order.
    pub fn tokens(&self) -> &[(String, u32)] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Split `text` into ordinary and special segments.
    ///
    /// Segments cover the input exactly and in order; empty text segments are skipped.
    pub fn split<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let Some(ref matcher) = self.matcher else {
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![Segment::Text(text)]
            };
        };

        let mut segments = Vec::new();
        let mut last = 0;

        for m in matcher.find_iter(text) {
            if m.start() > last {
                segments.push(Segment::Text(&text[last..m.start()]));
            }
            let id = self.tokens[m.pattern().as_usize()].1;
            segments.push(Segment::Special {
                id,
                text: &text[m.start()..m.end()],
            });
            last = m.end();
        }

        if last < text.len() {
            segments.push(Segment::Text(&text[last..]));
        }

        segments
    }
}

//! GPT-2 pre-tokenization scanner.
//!
//! Splits a text segment into chunks with the GPT-2 pattern. The whitespace
//! alternative needs a negative lookahead, so the pattern is compiled with
//! `fancy_regex`. Every character falls under one of the alternatives, so chunks
//! tile the input: concatenating them yields the input segment.

use bbpe_core::Result;
use fancy_regex::{Matches, Regex};
use std::sync::OnceLock;

/// GPT-2 pre-tokenization pattern, shared by RoBERTa and CLIP.
pub const GPT2_PATTERN: &str =
    r"'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?!\S)|\s+";

/// The compiled pattern, built on first use.
fn gpt2_regex() -> Result<&'static Regex> {
    static RE: OnceLock<Regex> = OnceLock::new();

    if let Some(re) = RE.get() {
        return Ok(re);
    }
    let re = Regex::new(GPT2_PATTERN)?;
    Ok(RE.get_or_init(|| re))
}

/// Lazy iterator over the chunks of a text segment.
pub struct Scanner<'a> {
    matches: Matches<'static, 'a>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Result<Self> {
        Ok(Self {
            matches: gpt2_regex()?.find_iter(text),
        })
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        self.matches
            .next()
            .map(|m| m.map(|m| m.as_str()).map_err(Into::into))
    }
}

//! Main tokenizer implementation.
//!
//! This module provides [`BpeTokenizer`], which drives one input string through
//! normalization, special token splitting, scanning, cached merging and sequence
//! wrapping, and [`BpeTokenizer::compute`] for padded batches.

pub mod batch;
pub mod config;

pub use batch::{BatchEncoding, OutputOptions};
pub use config::{ModelConfig, ModelFamily, TokenizerConfig, MAX_PADDING_LENGTH};

use crate::pre_tokenizer::{clean_up_whitespace, is_all_space, lowercase, Scanner};
use crate::utils::ChunkCache;
use bbpe_core::{
    byte_char, encode_bytes, BpeModel, Result, Segment, Symbol, SymbolList, TokenizerError,
};
use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, trace};

/// CLIP end-of-word marker appended to the last symbol of each chunk.
const END_OF_WORD: &str = "</w>";

/// Character span `(start, end)` of one token.
pub type Offset = (usize, usize);

/// Token ids for one input, with offsets when requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenizeResult {
    pub ids: Vec<u32>,
    /// One span per id, in character positions of the normalized input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offsets: Option<Vec<Offset>>,
}

impl TokenizeResult {
    fn new(with_offsets: bool) -> Self {
        Self {
            ids: Vec::new(),
            offsets: with_offsets.then(Vec::new),
        }
    }

    #[inline]
    fn push(&mut self, id: u32, span: Offset) {
        self.ids.push(id);
        if let Some(offsets) = self.offsets.as_mut() {
            offsets.push(span);
        }
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    vocab: Option<String>,
    merges: Option<String>,
    config: TokenizerConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `vocab.json` contents.
    pub fn vocab(mut self, text: impl Into<String>) -> Self {
        self.vocab = Some(text.into());
        self
    }

    /// Set the `merges.txt` contents.
    pub fn merges(mut self, text: impl Into<String>) -> Self {
        self.merges = Some(text.into());
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: TokenizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Select the model family; its default special tokens apply unless overridden.
    pub fn family(mut self, family: ModelFamily) -> Self {
        self.config.family = family;
        self
    }

    /// Override the unknown token.
    pub fn unk_token(mut self, token: impl Into<String>) -> Self {
        self.config.special_tokens.unk = Some(token.into());
        self
    }

    /// Override the BOS token (an empty string removes it).
    pub fn bos_token(mut self, token: impl Into<String>) -> Self {
        self.config.special_tokens.bos = Some(token.into());
        self
    }

    /// Override the EOS token.
    pub fn eos_token(mut self, token: impl Into<String>) -> Self {
        self.config.special_tokens.eos = Some(token.into());
        self
    }

    /// Override the padding token.
    pub fn pad_token(mut self, token: impl Into<String>) -> Self {
        self.config.special_tokens.pad = Some(token.into());
        self
    }

    /// Add a special token matched verbatim in the input.
    pub fn additional_special_token(mut self, token: impl Into<String>) -> Self {
        self.config.special_tokens.additional.push(token.into());
        self
    }

    /// Set the padding length (-1 pads to the longest input of each batch).
    pub fn padding_length(mut self, length: i64) -> Self {
        self.config.padding_length = length;
        self
    }

    /// Set the capacity of per-call chunk caches.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<BpeTokenizer> {
        let vocab = self
            .vocab
            .ok_or_else(|| TokenizerError::InvalidConfig("vocabulary not set".to_string()))?;
        let merges = self
            .merges
            .ok_or_else(|| TokenizerError::InvalidConfig("merges not set".to_string()))?;
        BpeTokenizer::new(&vocab, &merges, self.config)
    }
}

/// Byte-level BPE tokenizer for one model family.
///
/// Immutable after construction; share it by reference across threads and give each
/// thread its own [`ChunkCache`] when reusing caches across calls.
#[derive(Debug, Clone)]
pub struct BpeTokenizer {
    model: BpeModel,
    config: ModelConfig,
    /// Validated build settings, for padding and cache sizing
    settings: TokenizerConfig,
}

impl BpeTokenizer {
    /// Create a tokenizer from `vocab.json` and `merges.txt` contents.
    pub fn new(vocab_text: &str, merges_text: &str, config: TokenizerConfig) -> Result<Self> {
        config.validate()?;

        let tokens = config.resolved_special_tokens();
        let unk = tokens.unk.clone().ok_or_else(|| {
            TokenizerError::InvalidConfig("an unknown token is required".to_string())
        })?;
        let model = BpeModel::load(vocab_text, merges_text, &unk, &tokens.to_list())?;
        let model_config = ModelConfig::resolve(config.family, &tokens, &model)?;

        debug!(
            family = %config.family,
            vocab_size = model.vocab_size(),
            pad_id = model_config.pad_id,
            padding_length = config.padding_length,
            "built tokenizer"
        );

        Ok(Self {
            model,
            config: model_config,
            settings: config,
        })
    }

    /// Start a [`TokenizerBuilder`].
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Tokenize one input with a fresh chunk cache.
    ///
    /// `max_length` bounds the number of ids before the EOS token, which is always
    /// appended for wrapping families.
    pub fn tokenize(
        &self,
        text: &str,
        max_length: Option<usize>,
        with_offsets: bool,
    ) -> Result<TokenizeResult> {
        let mut cache = ChunkCache::with_capacity(self.settings.cache_capacity)?;
        self.tokenize_with_cache(text, max_length, with_offsets, &mut cache)
    }

    /// Tokenize one input, reusing a caller-owned chunk cache.
    pub fn tokenize_with_cache(
        &self,
        text: &str,
        max_length: Option<usize>,
        with_offsets: bool,
        cache: &mut ChunkCache,
    ) -> Result<TokenizeResult> {
        let family = self.config.family;
        let budget = max_length.unwrap_or(usize::MAX);
        let wrap = self.wrapping_ids();

        let text: Cow<'_, str> = if family.cleans_up_spaces() {
            Cow::Owned(clean_up_whitespace(text))
        } else {
            Cow::Borrowed(text)
        };

        let mut out = TokenizeResult::new(with_offsets);

        if let Some((bos, eos)) = wrap {
            if is_all_space(&text) {
                out.push(bos, (0, 0));
                out.push(eos, (0, 0));
                return Ok(out);
            }
            out.push(bos, (0, 0));
        }

        let text: Cow<'_, str> = if family.lowercases() {
            Cow::Owned(lowercase(&text))
        } else {
            text
        };

        let mut char_pos = 0;
        'segments: for segment in self.model.split_by_special_tokens(&text) {
            if out.len() >= budget {
                break;
            }

            match segment {
                Segment::Special { id, text } => {
                    let len = text.chars().count();
                    out.push(id, (char_pos, char_pos + len));
                    char_pos += len;
                }
                Segment::Text(segment) => {
                    for chunk in Scanner::new(segment)? {
                        let chunk = chunk?;
                        if out.len() >= budget {
                            break 'segments;
                        }
                        self.emit_chunk(chunk, char_pos, budget, cache, &mut out)?;
                        char_pos += chunk.chars().count();
                    }
                }
            }
        }

        if let Some((_, eos)) = wrap {
            out.push(eos, (0, 0));
        }

        let stats = cache.stats();
        trace!(
            tokens = out.len(),
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            "tokenized input"
        );

        Ok(out)
    }

    /// Tokenize a batch and pad it to a common width.
    pub fn compute<S: AsRef<str>>(
        &self,
        texts: &[S],
        options: OutputOptions,
    ) -> Result<BatchEncoding> {
        let max_length = self.fixed_width();
        let results = texts
            .iter()
            .map(|text| self.tokenize(text.as_ref(), max_length, options.offsets))
            .collect::<Result<Vec<_>>>()?;

        let batch =
            BatchEncoding::from_results(&results, max_length, self.config.pad_id, options)?;
        debug!(
            batch_size = batch.batch_size(),
            width = batch.width(),
            "computed batch"
        );

        Ok(batch)
    }

    /// BOS and EOS ids for families that wrap their output.
    fn wrapping_ids(&self) -> Option<(u32, u32)> {
        if !self.config.family.wraps_sequence() {
            return None;
        }
        self.config.bos_id.zip(self.config.eos_id)
    }

    /// Look up or merge one chunk and append its symbols within the budget.
    fn emit_chunk(
        &self,
        chunk: &str,
        char_pos: usize,
        budget: usize,
        cache: &mut ChunkCache,
        out: &mut TokenizeResult,
    ) -> Result<()> {
        if !cache.already_tokenized(chunk) {
            cache.add(chunk, self.encode_chunk(chunk));
        }
        let symbols = cache.get_output(chunk)?;

        let spans = match out.offsets {
            Some(_) => Some(self.symbol_spans(chunk, char_pos, symbols)?),
            None => None,
        };

        for (i, symbol) in symbols.iter().enumerate() {
            if out.len() >= budget {
                break;
            }
            let span = spans.as_ref().map_or((0, 0), |s| s[i]);
            out.push(symbol.id, span);
        }

        Ok(())
    }

    /// Byte-encode and merge one chunk.
    ///
    /// When the merged symbols still contain the unknown token (byte placeholders
    /// missing from the vocabulary), a vocabulary entry for the whole encoded chunk
    /// replaces them.
    fn encode_chunk(&self, chunk: &str) -> SymbolList {
        let encoder = self.model.byte_encoder();
        let end_of_word = self.config.family.cleans_up_spaces();

        let bytes: Cow<'_, [u8]> = if end_of_word {
            Cow::Owned(chunk.bytes().filter(|&b| b != b' ').collect())
        } else {
            Cow::Borrowed(chunk.as_bytes())
        };

        let mut symbols: SymbolList = bytes
            .iter()
            .map(|&b| Symbol::new(encoder.id(b), 1))
            .collect();
        if end_of_word {
            if let (Some(symbol), Some(&last)) = (symbols.last_mut(), bytes.last()) {
                let mut marked = String::with_capacity(8);
                marked.push(byte_char(last));
                marked.push_str(END_OF_WORD);
                symbol.id = self.model.token_id(&marked);
            }
        }

        self.model.bpe(&mut symbols);

        let unk = self.model.unk_id();
        if symbols.len() > 1 && symbols.iter().any(|s| s.id == unk) {
            let mut word = encode_bytes(&bytes);
            if end_of_word {
                word.push_str(END_OF_WORD);
            }
            if let Some(id) = self.model.get_id(&word) {
                return vec![Symbol::new(id, bytes.len() as u32)];
            }
        }

        symbols
    }

    /// Character spans of each symbol of a chunk starting at `char_pos`.
    ///
    /// A symbol spans every character its source bytes belong to. A leading space in a
    /// non-CLIP chunk is left out of the first symbol unless that symbol is only the space.
    fn symbol_spans(
        &self,
        chunk: &str,
        char_pos: usize,
        symbols: &SymbolList,
    ) -> Result<Vec<Offset>> {
        let drops_spaces = self.config.family.cleans_up_spaces();

        let mut byte_chars: Vec<usize> = Vec::with_capacity(chunk.len());
        for (i, c) in chunk.chars().enumerate() {
            if drops_spaces && c == ' ' {
                continue;
            }
            byte_chars.extend(std::iter::repeat(char_pos + i).take(c.len_utf8()));
        }

        let covered: usize = symbols.iter().map(|s| s.len as usize).sum();
        if covered != byte_chars.len() || symbols.iter().any(|s| s.len == 0) {
            return Err(TokenizerError::InternalInvariant(format!(
                "symbols cover {} bytes of chunk {:?}, expected {}",
                covered,
                chunk,
                byte_chars.len()
            )));
        }

        let skip_space = !drops_spaces && chunk.starts_with(' ');
        let mut spans = Vec::with_capacity(symbols.len());
        let mut pos = 0;
        for (i, symbol) in symbols.iter().enumerate() {
            let len = symbol.len as usize;
            let first = if i == 0 && skip_space && len > 1 {
                pos + 1
            } else {
                pos
            };
            spans.push((byte_chars[first], byte_chars[pos + len - 1] + 1));
            pos += len;
        }

        Ok(spans)
    }

    /// Padding length as a fixed width, `None` when padding to the longest input.
    pub fn fixed_width(&self) -> Option<usize> {
        self.settings.fixed_width()
    }

    /// Configured padding length, -1 for pad-to-longest.
    pub fn padding_length(&self) -> i64 {
        self.settings.padding_length
    }

    /// Id written into padding positions.
    pub fn pad_id(&self) -> u32 {
        self.config.pad_id
    }

    pub fn family(&self) -> ModelFamily {
        self.config.family
    }

    /// Special token ids resolved against the vocabulary.
    pub fn model_config(&self) -> &ModelConfig {
        &self.config
    }

    /// Underlying vocabulary, merges and byte encoder.
    pub fn model(&self) -> &BpeModel {
        &self.model
    }

    /// Capacity of the cache created by [`tokenize`](Self::tokenize).
    pub fn cache_capacity(&self) -> usize {
        self.settings.cache_capacity
    }
}

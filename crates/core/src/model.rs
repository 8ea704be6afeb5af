//! Loaded byte-level BPE model.
//!
//! [`BpeModel`] owns everything that is fixed after construction: the vocabulary, the
//! merge ranks, the byte encoder and the special token matcher. It is immutable and can
//! be shared across threads by reference.

use crate::core::merges::MergeRules;
use crate::core::special::{Segment, SpecialTokenMap};
use crate::core::vocab::Vocabulary;
use crate::encoding::bpe::{apply_merges, SymbolList};
use crate::encoding::byte_level::ByteEncoder;
use crate::error::{Result, TokenizerError};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct BpeModel {
    vocab: Vocabulary,
    merges: MergeRules,
    byte_encoder: ByteEncoder,
    special_tokens: SpecialTokenMap,
    unk_id: u32,
}

impl BpeModel {
    /// Load a model from `vocab.json` and `merges.txt` contents.
    ///
    /// `unk_token` is registered first, then every entry of `special_tokens` in order.
    /// Special tokens missing from the vocabulary are appended after the largest id.
    pub fn load(
        vocab_text: &str,
        merges_text: &str,
        unk_token: &str,
        special_tokens: &[String],
    ) -> Result<Self> {
        if unk_token.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "unknown token must not be empty".to_string(),
            ));
        }

        let mut vocab = Vocabulary::from_json(vocab_text)?;

        let mut specials: Vec<(String, u32)> = Vec::with_capacity(special_tokens.len() + 1);
        for token in std::iter::once(unk_token).chain(special_tokens.iter().map(String::as_str)) {
            if token.is_empty() || specials.iter().any(|(t, _)| t == token) {
                continue;
            }
            let id = vocab.add_token(token)?;
            specials.push((token.to_string(), id));
        }
        let unk_id = specials[0].1;

        let merges = MergeRules::from_text(merges_text, &vocab)?;
        if merges.is_empty() {
            warn!("merge table is empty; only whole-chunk vocabulary hits will merge");
        }

        let byte_encoder = ByteEncoder::from_vocab(&vocab, unk_id);
        let unmapped = byte_encoder.unmapped(unk_id);
        if unmapped > 0 {
            warn!(
                unmapped,
                "byte placeholders missing from vocabulary, those bytes map to the unknown token"
            );
        }

        let special_tokens = SpecialTokenMap::new(specials)?;

        debug!(
            vocab_size = vocab.vocab_size(),
            merges = merges.len(),
            special_tokens = special_tokens.tokens().len(),
            "loaded BPE model"
        );

        Ok(Self {
            vocab,
            merges,
            byte_encoder,
            special_tokens,
            unk_id,
        })
    }

    /// Id of `token`, or the unknown token id when absent.
    #[inline]
    pub fn token_id(&self, token: &str) -> u32 {
        self.vocab.get_id(token).unwrap_or(self.unk_id)
    }

    /// Id of `token` if it is in the vocabulary.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get_id(token)
    }

    #[inline]
    pub fn byte_encoder(&self) -> &ByteEncoder {
        &self.byte_encoder
    }

    /// Split text on special tokens.
    pub fn split_by_special_tokens<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        self.special_tokens.split(text)
    }

    /// Run the merge engine over `symbols`.
    #[inline]
    pub fn bpe(&self, symbols: &mut SymbolList) {
        apply_merges(symbols, &self.merges);
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    pub fn special_tokens(&self) -> &SpecialTokenMap {
        &self.special_tokens
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.vocab_size()
    }

    pub fn unk_id(&self) -> u32 {
        self.unk_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::bpe::Symbol;

    const VOCAB: &str = r#"{"<unk>": 0, "h": 1, "e": 2, "l": 3, "o": 4, "he": 5, "ll": 6, "hell": 7, "hello": 8}"#;
    const MERGES: &str = "#version: 0.2\nh e\nl l\nhe ll\nhell o\n";

    #[test]
    fn test_load_and_lookup() {
        let model = BpeModel::load(VOCAB, MERGES, "<unk>", &[]).unwrap();

        assert_eq!(model.unk_id(), 0);
        assert_eq!(model.token_id("hello"), 8);
        assert_eq!(model.token_id("missing"), 0);
        assert_eq!(model.merges().len(), 4);
        assert_eq!(model.byte_encoder().id(b'h'), 1);
        assert_eq!(model.byte_encoder().id(b'z'), 0);
    }

    #[test]
    fn test_bpe_merges_word() {
        let model = BpeModel::load(VOCAB, MERGES, "<unk>", &[]).unwrap();
        let mut symbols: SymbolList = b"hello"
            .iter()
            .map(|&b| Symbol::new(model.byte_encoder().id(b), 1))
            .collect();
        model.bpe(&mut symbols);

        assert_eq!(symbols, vec![Symbol::new(8, 5)]);
    }

    #[test]
    fn test_missing_special_tokens_are_appended() {
        let specials = vec!["<s>".to_string(), "</s>".to_string(), "<unk>".to_string()];
        let model = BpeModel::load(VOCAB, MERGES, "<unk>", &specials).unwrap();

        assert_eq!(model.get_id("<s>"), Some(9));
        assert_eq!(model.get_id("</s>"), Some(10));
        assert_eq!(model.vocab_size(), 11);
        assert_eq!(model.special_tokens().tokens().len(), 3);
        assert_eq!(
            model.split_by_special_tokens("<s>he"),
            vec![Segment::Special { id: 9, text: "<s>" }, Segment::Text("he")]
        );
    }

    #[test]
    fn test_unk_token_added_when_absent() {
        let model = BpeModel::load(r#"{"a": 0, "b": 1}"#, "#version: 0.2\n", "<|endoftext|>", &[])
            .unwrap();
        assert_eq!(model.unk_id(), 2);
        assert!(model.merges().is_empty());
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            BpeModel::load(VOCAB, MERGES, "", &[]),
            Err(TokenizerError::InvalidConfig(_))
        ));
        assert!(matches!(
            BpeModel::load("", MERGES, "<unk>", &[]),
            Err(TokenizerError::InvalidFormat(_))
        ));
        assert!(matches!(
            BpeModel::load(VOCAB, "", "<unk>", &[]),
            Err(TokenizerError::InvalidFormat(_))
        ));
    }
}

//! Tokenizer configuration.
//!
//! A [`TokenizerConfig`] names the model family and optionally overrides its default
//! special tokens. It is resolved against a loaded vocabulary into a [`ModelConfig`]
//! holding the ids the orchestrator needs.

use crate::utils::DEFAULT_CACHE_CAPACITY;
use bbpe_core::{BpeModel, Result, SpecialTokensConfig, TokenizerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest accepted fixed padding length.
pub const MAX_PADDING_LENGTH: i64 = 1 << 20;

/// Supported byte-level BPE model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// GPT-2: no sequence wrapping, no normalization
    #[default]
    Gpt2,
    /// RoBERTa: GPT-2 scanning with `<s>` ... `</s>` wrapping
    Roberta,
    /// CLIP: whitespace clean-up, lowercasing and `</w>` end-of-word symbols
    Clip,
}

impl ModelFamily {
    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            ModelFamily::Gpt2 => "gpt2",
            ModelFamily::Roberta => "roberta",
            ModelFamily::Clip => "clip",
        }
    }

    /// Whether outputs are wrapped in BOS/EOS.
    pub fn wraps_sequence(self) -> bool {
        !matches!(self, ModelFamily::Gpt2)
    }

    /// Whether whitespace is collapsed and dropped from chunks, with the last byte of
    /// each chunk encoded as an end-of-word symbol.
    pub fn cleans_up_spaces(self) -> bool {
        matches!(self, ModelFamily::Clip)
    }

    /// Whether input is lowercased before splitting.
    pub fn lowercases(self) -> bool {
        matches!(self, ModelFamily::Clip)
    }

    /// Default special token strings.
    pub fn default_special_tokens(self) -> SpecialTokensConfig {
        let token = |s: &str| Some(s.to_string());
        match self {
            ModelFamily::Gpt2 => SpecialTokensConfig {
                unk: token("<|endoftext|>"),
                bos: token("<|endoftext|>"),
                eos: token("<|endoftext|>"),
                pad: None,
                additional: Vec::new(),
            },
            ModelFamily::Roberta => SpecialTokensConfig {
                unk: token("<unk>"),
                bos: token("<s>"),
                eos: token("</s>"),
                pad: token("<pad>"),
                additional: Vec::new(),
            },
            ModelFamily::Clip => SpecialTokensConfig {
                unk: token("<|endoftext|>"),
                bos: token("<|startoftext|>"),
                eos: token("<|endoftext|>"),
                pad: token("<|endoftext|>"),
                additional: Vec::new(),
            },
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelFamily {
    type Err = TokenizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gpt2" | "gpt-2" => Ok(ModelFamily::Gpt2),
            "roberta" => Ok(ModelFamily::Roberta),
            "clip" => Ok(ModelFamily::Clip),
            other => Err(TokenizerError::InvalidConfig(format!(
                "unknown model family '{}', expected gpt2, roberta or clip",
                other
            ))),
        }
    }
}

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Model family
    pub family: ModelFamily,
    /// Overrides for the family's default special tokens
    pub special_tokens: SpecialTokensConfig,
    /// Fixed output width, or -1 to pad to the longest input of each batch
    pub padding_length: i64,
    /// Capacity of the per-call chunk cache
    pub cache_capacity: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            family: ModelFamily::default(),
            special_tokens: SpecialTokensConfig::default(),
            padding_length: -1,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl TokenizerConfig {
    /// Defaults for `family`.
    pub fn new(family: ModelFamily) -> Self {
        Self {
            family,
            ..Self::default()
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.padding_length != -1 && self.padding_length <= 0 {
            return Err(TokenizerError::InvalidConfig(format!(
                "padding_length must be -1 or greater than 0, got {}",
                self.padding_length
            )));
        }
        if self.padding_length > MAX_PADDING_LENGTH {
            return Err(TokenizerError::InvalidConfig(format!(
                "padding_length {} exceeds the maximum of {}",
                self.padding_length, MAX_PADDING_LENGTH
            )));
        }
        if self.cache_capacity == 0 {
            return Err(TokenizerError::InvalidConfig(
                "cache_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Family defaults with every configured override applied.
    ///
    /// An override set to the empty string removes the token.
    pub fn resolved_special_tokens(&self) -> SpecialTokensConfig {
        let defaults = self.family.default_special_tokens();
        let pick = |over: &Option<String>, default: Option<String>| match over {
            Some(s) if s.is_empty() => None,
            Some(s) => Some(s.clone()),
            None => default,
        };

        SpecialTokensConfig {
            unk: pick(&self.special_tokens.unk, defaults.unk),
            bos: pick(&self.special_tokens.bos, defaults.bos),
            eos: pick(&self.special_tokens.eos, defaults.eos),
            pad: pick(&self.special_tokens.pad, defaults.pad),
            additional: self.special_tokens.additional.clone(),
        }
    }

    /// Padding length as an optional fixed width.
    pub fn fixed_width(&self) -> Option<usize> {
        usize::try_from(self.padding_length).ok()
    }
}

/// Family and special token ids resolved against a loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    pub family: ModelFamily,
    pub unk_id: u32,
    pub bos_id: Option<u32>,
    pub eos_id: Option<u32>,
    /// Id written into padding positions (0 when the family has no pad token)
    pub pad_id: u32,
}

impl ModelConfig {
    /// Resolve token strings to ids.
    ///
    /// Families that wrap their output must have both a BOS and an EOS token.
    pub fn resolve(
        family: ModelFamily,
        tokens: &SpecialTokensConfig,
        model: &BpeModel,
    ) -> Result<Self> {
        let id = |token: &Option<String>| token.as_deref().map(|t| model.token_id(t));

        let bos_id = id(&tokens.bos);
        let eos_id = id(&tokens.eos);
        if family.wraps_sequence() && (bos_id.is_none() || eos_id.is_none()) {
            return Err(TokenizerError::InvalidConfig(format!(
                "{} requires both a bos and an eos token",
                family
            )));
        }

        Ok(Self {
            family,
            unk_id: model.unk_id(),
            bos_id,
            eos_id,
            pad_id: id(&tokens.pad).unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_parsing() {
        assert_eq!("gpt2".parse::<ModelFamily>().unwrap(), ModelFamily::Gpt2);
        assert_eq!("RoBERTa".parse::<ModelFamily>().unwrap(), ModelFamily::Roberta);
        assert_eq!("clip".parse::<ModelFamily>().unwrap(), ModelFamily::Clip);
        assert!(matches!(
            "bert".parse::<ModelFamily>(),
            Err(TokenizerError::InvalidConfig(_))
        ));
        assert_eq!(ModelFamily::Clip.to_string(), "clip");
    }

    #[test]
    fn test_family_flags() {
        assert!(!ModelFamily::Gpt2.wraps_sequence());
        assert!(ModelFamily::Roberta.wraps_sequence());
        assert!(!ModelFamily::Roberta.cleans_up_spaces());
        assert!(ModelFamily::Clip.cleans_up_spaces());
        assert!(ModelFamily::Clip.lowercases());
    }

    #[test]
    fn test_validate() {
        let mut config = TokenizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fixed_width(), None);

        config.padding_length = 16;
        assert!(config.validate().is_ok());
        assert_eq!(config.fixed_width(), Some(16));

        config.padding_length = MAX_PADDING_LENGTH;
        assert!(config.validate().is_ok());

        for bad in [0, -2, MAX_PADDING_LENGTH + 1, 1_000_000_000_000] {
            config.padding_length = bad;
            assert!(matches!(
                config.validate(),
                Err(TokenizerError::InvalidConfig(_))
            ));
        }

        let config = TokenizerConfig {
            cache_capacity: 0,
            ..TokenizerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolved_special_tokens() {
        let mut config = TokenizerConfig::new(ModelFamily::Roberta);
        config.special_tokens.pad = Some(String::new());
        config.special_tokens.bos = Some("<bos>".to_string());

        let tokens = config.resolved_special_tokens();
        assert_eq!(tokens.unk.as_deref(), Some("<unk>"));
        assert_eq!(tokens.bos.as_deref(), Some("<bos>"));
        assert_eq!(tokens.eos.as_deref(), Some("</s>"));
        assert_eq!(tokens.pad, None);
    }

    #[test]
    fn test_config_from_json() {
        let config: TokenizerConfig =
            serde_json::from_str(r#"{"family": "clip", "padding_length": 77}"#).unwrap();

        assert_eq!(config.family, ModelFamily::Clip);
        assert_eq!(config.padding_length, 77);
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert_eq!(config.special_tokens, SpecialTokensConfig::default());
    }

    #[test]
    fn test_model_config_requires_wrapping_tokens() {
        let model = BpeModel::load(r#"{"a": 0}"#, "#version: 0.2\n", "<unk>", &[]).unwrap();
        let tokens = SpecialTokensConfig {
            unk: Some("<unk>".to_string()),
            ..SpecialTokensConfig::default()
        };

        assert!(ModelConfig::resolve(ModelFamily::Gpt2, &tokens, &model).is_ok());
        assert!(matches!(
            ModelConfig::resolve(ModelFamily::Roberta, &tokens, &model),
            Err(TokenizerError::InvalidConfig(_))
        ));
    }
}

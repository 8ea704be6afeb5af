//! Load functionality for pre-trained tokenizers.
//!
//! This module provides methods for building tokenizers from `vocab.json` and
//! `merges.txt` files on disk, plus JSON tokenizer configuration files.

use crate::tokenizer::{BpeTokenizer, TokenizerConfig};
use bbpe_core::{Result, TokenizerError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Tokenizer loader - handles loading pre-trained models.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Build a tokenizer from a vocabulary file and a merges file.
    pub fn load_files(
        vocab_path: &Path,
        merges_path: &Path,
        config: TokenizerConfig,
    ) -> Result<BpeTokenizer> {
        let vocab = read_file(vocab_path)?;
        let merges = read_file(merges_path)?;

        debug!(
            vocab = %vocab_path.display(),
            merges = %merges_path.display(),
            family = %config.family,
            "loading tokenizer files"
        );

        BpeTokenizer::new(&vocab, &merges, config)
    }

    /// Load from HuggingFace layout (vocab.json + merges.txt).
    ///
    /// Expects two files in the given directory:
    /// - `vocab.json`: Token to ID mapping
    /// - `merges.txt`: Merge rules, one per line
    pub fn load_dir(path: &Path, config: TokenizerConfig) -> Result<BpeTokenizer> {
        Self::load_files(&path.join("vocab.json"), &path.join("merges.txt"), config)
    }

    /// Read a JSON [`TokenizerConfig`]; missing fields take their defaults.
    pub fn load_config(path: &Path) -> Result<TokenizerConfig> {
        let file = File::open(path).map_err(|err| TokenizerError::Io {
            path: path.to_path_buf(),
            err,
        })?;

        let config: TokenizerConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| TokenizerError::Io {
        path: path.to_path_buf(),
        err,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::ModelFamily;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bbpe_test_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_dir() {
        let dir = temp_dir("load_dir");
        std::fs::write(
            dir.join("vocab.json"),
            r#"{"<unk>": 0, "<s>": 1, "</s>": 2, "<pad>": 3, "h": 4, "i": 5, "hi": 6}"#,
        )
        .unwrap();
        std::fs::write(dir.join("merges.txt"), "#version: 0.2\nh i\n").unwrap();

        let tokenizer =
            TokenizerLoader::load_dir(&dir, TokenizerConfig::new(ModelFamily::Roberta)).unwrap();
        let result = tokenizer.tokenize("hi", None, false).unwrap();
        assert_eq!(result.ids, vec![1, 6, 2]);
        assert_eq!(tokenizer.pad_id(), 3);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = temp_dir("missing");
        let err = TokenizerLoader::load_dir(&dir, TokenizerConfig::default()).unwrap_err();

        match err {
            TokenizerError::Io { path, .. } => assert_eq!(path, dir.join("vocab.json")),
            other => panic!("unexpected error: {}", other),
        }

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_config() {
        let dir = temp_dir("config");
        let path = dir.join("config.json");
        std::fs::write(
            &path,
            r#"{"family": "roberta", "special_tokens": {"additional": ["<mask>"]}}"#,
        )
        .unwrap();

        let config = TokenizerLoader::load_config(&path).unwrap();
        assert_eq!(config.family, ModelFamily::Roberta);
        assert_eq!(config.special_tokens.additional, vec!["<mask>".to_string()]);
        assert_eq!(config.padding_length, -1);

        std::fs::write(&path, r#"{"padding_length": -5}"#).unwrap();
        assert!(matches!(
            TokenizerLoader::load_config(&path),
            Err(TokenizerError::InvalidConfig(_))
        ));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            TokenizerLoader::load_config(&path),
            Err(TokenizerError::Json(_))
        ));

        std::fs::remove_dir_all(dir).ok();
    }
}

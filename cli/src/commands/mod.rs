//! CLI commands for the bbpe tokenizer.

pub mod benchmark;
pub mod encode;

pub use benchmark::BenchmarkCommand;
pub use encode::EncodeCommand;

use anyhow::{bail, Context, Result as AnyhowResult};
use bbpe_tokenizer::{BpeTokenizer, ModelFamily, TokenizerConfig, TokenizerLoader};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Arguments locating a pre-trained model.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Directory containing vocab.json and merges.txt
    #[arg(short, long, conflicts_with_all = ["vocab", "merges"])]
    pub dir: Option<PathBuf>,

    /// Path to vocab.json
    #[arg(long, requires = "merges")]
    pub vocab: Option<PathBuf>,

    /// Path to merges.txt
    #[arg(long, requires = "vocab")]
    pub merges: Option<PathBuf>,

    /// JSON tokenizer configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Model family (gpt2, roberta, clip); overrides the configuration file
    #[arg(short, long)]
    pub model: Option<ModelFamily>,

    /// Fixed output width, or -1 to pad to the longest input
    #[arg(long, allow_hyphen_values = true)]
    pub padding_length: Option<i64>,
}

impl ModelArgs {
    /// Build the tokenizer described by these arguments.
    pub fn load(&self) -> AnyhowResult<BpeTokenizer> {
        let mut config = match &self.config {
            Some(path) => TokenizerLoader::load_config(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => TokenizerConfig::default(),
        };
        if let Some(family) = self.model {
            config.family = family;
        }
        if let Some(length) = self.padding_length {
            config.padding_length = length;
        }

        let tokenizer = match (&self.dir, &self.vocab, &self.merges) {
            (Some(dir), _, _) => TokenizerLoader::load_dir(dir, config)?,
            (None, Some(vocab), Some(merges)) => {
                TokenizerLoader::load_files(vocab, merges, config)?
            }
            _ => bail!("either --dir or both --vocab and --merges are required"),
        };

        info!(
            family = %tokenizer.family(),
            vocab_size = tokenizer.model().vocab_size(),
            "tokenizer ready"
        );
        Ok(tokenizer)
    }
}

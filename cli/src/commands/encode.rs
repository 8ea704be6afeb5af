//! Encode command implementation.

use super::ModelArgs;
use clap::{Parser, ValueEnum};

/// Output formats.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line of ids per input
    #[default]
    Text,
    /// The whole batch as a JSON object
    Json,
}

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Text to encode; repeat for a batch, "-" reads one input per stdin line
    #[arg(short, long, required = true)]
    pub input: Vec<String>,

    /// Also output the attention mask
    #[arg(long, default_value_t = false)]
    pub attention_mask: bool,

    /// Also output character offsets
    #[arg(long, default_value_t = false)]
    pub offsets: bool,

    /// Tokenize inputs in parallel
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,
}

use anyhow::Result as AnyhowResult;
use bbpe_tokenizer::{BatchEncoding, BpeTokenizer, OutputOptions, Result, TokenizeResult};
use rayon::prelude::*;
use std::io::BufRead;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    let tokenizer = cmd.model.load()?;
    let texts = read_inputs(&cmd.input)?;

    let options = OutputOptions {
        attention_mask: cmd.attention_mask,
        offsets: cmd.offsets,
    };

    let batch = if cmd.parallel {
        compute_parallel(&tokenizer, &texts, options)?
    } else {
        tokenizer.compute(texts.as_slice(), options)?
    };

    match cmd.output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&batch)?),
        OutputFormat::Text => print_text(&batch),
    }

    Ok(())
}

/// Expand "-" into one input per stdin line.
fn read_inputs(inputs: &[String]) -> AnyhowResult<Vec<String>> {
    let mut texts = Vec::with_capacity(inputs.len());
    for input in inputs {
        if input == "-" {
            for line in std::io::stdin().lock().lines() {
                texts.push(line?);
            }
        } else {
            texts.push(input.clone());
        }
    }
    Ok(texts)
}

/// Same result as [`BpeTokenizer::compute`], with one input per rayon task.
fn compute_parallel(
    tokenizer: &BpeTokenizer,
    texts: &[String],
    options: OutputOptions,
) -> Result<BatchEncoding> {
    let max_length = tokenizer.fixed_width();
    let results = texts
        .par_iter()
        .map(|text| tokenizer.tokenize(text, max_length, options.offsets))
        .collect::<Result<Vec<TokenizeResult>>>()?;

    BatchEncoding::from_results(&results, max_length, tokenizer.pad_id(), options)
}

fn print_text(batch: &BatchEncoding) {
    let join = |values: &[i64]| {
        values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };

    for row in 0..batch.batch_size() {
        println!("{}", join(batch.ids_row(row)));
        if let Some(mask) = batch.mask_row(row) {
            println!("mask: {}", join(mask));
        }
        if let Some(offsets) = batch.offsets_row(row) {
            let spans: Vec<String> = offsets
                .iter()
                .map(|(start, end)| format!("{}:{}", start, end))
                .collect();
            println!("offsets: {}", spans.join(" "));
        }
    }
}

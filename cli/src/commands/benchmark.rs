//! Benchmark command implementation.

use super::ModelArgs;
use clap::Parser;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Path to input text file for benchmarking
    #[arg(short, long)]
    pub input: String,

    /// Number of iterations to run
    #[arg(short = 'n', long, default_value_t = 100)]
    pub iterations: usize,

    /// Keep one chunk cache across iterations instead of one per call
    #[arg(long, default_value_t = false)]
    pub reuse_cache: bool,
}

use anyhow::{ensure, Result as AnyhowResult};
use bbpe_tokenizer::ChunkCache;
use std::fs;
use std::time::Instant;

pub fn run(cmd: BenchmarkCommand) -> AnyhowResult<()> {
    ensure!(cmd.iterations > 0, "--iterations must be greater than 0");

    let tokenizer = cmd.model.load()?;
    let text = fs::read_to_string(&cmd.input)?;

    println!("Benchmarking {} tokenizer...", tokenizer.family());
    println!("  Text length: {} bytes", text.len());
    println!("  Iterations: {}", cmd.iterations);
    println!();

    let mut cache = ChunkCache::with_capacity(tokenizer.cache_capacity())?;
    let mut encode = |text: &str| {
        if cmd.reuse_cache {
            tokenizer.tokenize_with_cache(text, None, false, &mut cache)
        } else {
            tokenizer.tokenize(text, None, false)
        }
    };

    // Warmup
    let tokens = encode(&text)?.len();

    let start = Instant::now();
    for _ in 0..cmd.iterations {
        encode(&text)?;
    }
    let elapsed = start.elapsed();

    let avg_secs = elapsed.as_secs_f64() / cmd.iterations as f64;

    println!("Results:");
    println!("  Tokens per call: {}", tokens);
    println!("  Total time: {:.2}s", elapsed.as_secs_f64());
    println!("  Average time: {:.3}ms", avg_secs * 1000.0);
    if avg_secs > 0.0 {
        println!("  Throughput: {:.0} tokens/s", tokens as f64 / avg_secs);
        println!(
            "  Throughput: {:.2} MB/s",
            text.len() as f64 / avg_secs / 1_000_000.0
        );
    }
    if cmd.reuse_cache {
        let stats = cache.stats();
        println!(
            "  Cache: {} entries, hit rate {:.1}%",
            stats.entries,
            stats.hit_rate().unwrap_or(0.0) * 100.0
        );
    }

    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::builder::RangedU64ValueParser;
use clap::Parser;

use ipv4_cardinality::hyperloglog::DEFAULT_PRECISION;
use ipv4_cardinality::{count_unique, logging, Config};

/// Estimate the number of unique IPv4 addresses in a file with one address per line.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to file with IPv4 addresses (one per line)
    input: PathBuf,

    /// HyperLogLog precision, number of registers is 2^PRECISION
    #[arg(default_value_t = DEFAULT_PRECISION, value_parser = clap::value_parser!(u8).range(4..=18))]
    precision: u8,

    /// Number of workers scanning the file in parallel
    #[arg(short, long, default_value_t = 1, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    workers: usize,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = Config::default()
        .with_precision(args.precision)
        .with_workers(args.workers);
    config.validate()?;

    let registers = 1usize << config.precision;
    println!(
        "HyperLogLog initialized with precision={} ({} registers, ~{} bytes)",
        config.precision, registers, registers
    );
    println!(
        "Expected standard error: ~{:.2}%",
        104.0 / (registers as f64).sqrt()
    );
    println!("Workers: {}", config.workers);
    println!(
        "Memory: ~{} KB per worker, ~{} KB total\n",
        registers / 1024,
        config.sketch_memory() / 1024
    );

    let report = count_unique(&args.input, &config)
        .with_context(|| format!("failed to process {}", args.input.display()))?;

    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("RESULTS");
    println!("{rule}");
    println!("Total lines processed:    {}", report.lines);
    println!("Unique IP addresses:      {}", report.estimate);
    println!("Processing time:          {:?}", report.elapsed);
    println!(
        "Processing rate:          {:.2} M lines/sec",
        report.lines_per_second() / 1_000_000.0
    );
    println!("Workers used:             {}", report.workers);
    println!(
        "Memory used:              ~{} KB",
        registers * report.workers / 1024
    );
    println!("{rule}");

    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use ipv4_cardinality::generator::generate_file;
use ipv4_cardinality::logging;

/// Generate a test file of random IPv4 addresses, one per line.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of lines to write
    num_lines: u64,

    /// Fraction of lines drawn from distinct addresses, in (0, 1]
    #[arg(default_value_t = 0.5)]
    unique_ratio: f64,

    /// Output file
    #[arg(default_value = "test.txt")]
    output: PathBuf,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
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
    let started = Instant::now();
    generate_file(&args.output, args.num_lines, args.unique_ratio, args.seed)
        .with_context(|| format!("failed to generate {}", args.output.display()))?;

    let size = std::fs::metadata(&args.output)?.len();
    println!("Done! File: {}", args.output.display());
    println!("Generation took: {:?}", started.elapsed());
    println!("File size: {:.2} MB", size as f64 / (1024.0 * 1024.0));

    Ok(())
}

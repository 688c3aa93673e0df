//! CLI for queneau: scan ranges for Queneau numbers and accumulate range counts.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "queneau")]
#[command(about = "queneau - parallel search for Queneau numbers")]
#[command(version = queneau_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count Queneau numbers in [start, stop) and print a summary.
    Scan {
        /// Prime table file (whitespace-separated, ascending). Generated when omitted.
        #[arg(long)]
        primes: Option<String>,

        /// First n scanned
        #[arg(long, default_value_t = 0)]
        start: u64,

        /// One past the last n scanned
        #[arg(long, default_value_t = 2_000_000)]
        stop: u64,

        /// Chunk width; a positive multiple of 4 dividing stop - start
        #[arg(long, default_value_t = 50_000)]
        chunk_size: u64,

        /// Worker threads (default: available parallelism)
        #[arg(long)]
        workers: Option<usize>,

        /// Write every Queneau number found to this file, one per line
        #[arg(long)]
        list: Option<String>,

        /// Append a `<start>-to-<stop>: <count>` line to this file
        #[arg(long)]
        tally: Option<String>,

        /// Write a JSON report to this file
        #[arg(long)]
        output: Option<String>,

        /// Print twin counts and residue histograms of the numbers found
        #[arg(long)]
        residues: bool,
    },

    /// Turn `<label>-to-<upper>: <count>` lines into running totals.
    /// Usage: cumulate [SEED] INPUT, where INPUT may be `-` for stdin.
    Cumulate {
        /// Optional starting total followed by the input path
        #[arg(num_args = 1..=2, required = true, value_name = "[SEED] INPUT")]
        operands: Vec<String>,
    },

    /// Generate every prime up to LIMIT in the table format read by `scan --primes`.
    Primes {
        /// Largest value sieved
        limit: u64,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            primes,
            start,
            stop,
            chunk_size,
            workers,
            list,
            tally,
            output,
            residues,
        } => commands::scan::run(commands::scan::ScanCommandConfig {
            primes_path: primes.as_deref(),
            start,
            stop,
            chunk_size,
            workers,
            list_path: list.as_deref(),
            tally_path: tally.as_deref(),
            output_path: output.as_deref(),
            residues,
        }),
        Commands::Cumulate { operands } => commands::cumulate::run(&operands),
        Commands::Primes { limit, output } => commands::primes::run(limit, output.as_deref()),
    }
}

//! # queneau-core
//!
//! Search for **Queneau numbers**: positive integers `n` such that `2n + 1`
//! is prime and 2 (or −2, when `n ≡ 3 mod 4`) is a primitive root modulo
//! `2n + 1`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use queneau_core::{PrimeTable, ScanConfig, ScanSummary, scan};
//!
//! let config = ScanConfig::new(0, 1_000_000, 50_000);
//! let primes = PrimeTable::for_range(config.stop).unwrap();
//! let results = scan(&config, &primes).unwrap();
//! let summary = ScanSummary::from_results(config.start, config.stop, &results).unwrap();
//! println!("{}", summary.total_line());
//! ```
//!
//! ## Architecture
//!
//! PrimeTable → ChunkSieve → primitive-root test → ChunkWorker → scan → ScanSummary
//!
//! The range is cut into equal chunks. Each chunk is sieved on its own: odd
//! moduli with a small prime factor are struck, and the small prime factors
//! of every surviving order `2n` are counted. The root test then needs only
//! `log n` modular multiplications per prime factor. Chunks run in parallel
//! on scoped threads and come back in chunk order.
//!
//! Separately, [`Cumulator`] turns a stream of `<start>-to-<stop>: <count>`
//! lines into running totals.

pub mod arith;
pub mod cumulate;
pub mod error;
pub mod primes;
pub mod residues;
pub mod root;
pub mod scan;
pub mod sieve;
pub mod summary;
pub mod worker;

pub use cumulate::{Cumulator, cumulate, split_tally_line};
pub use error::{QueneauError, Result};
pub use primes::PrimeTable;
pub use residues::ResidueProfile;
pub use root::{chk_prim_root, is_queneau, order_factors};
pub use scan::{ScanConfig, scan};
pub use sieve::{ChunkSieve, FactorMap, MAX_DISTINCT_FACTORS, SieveOutcome};
pub use summary::{SAMPLE_LEN, ScanReport, ScanSummary, format_sci};
pub use worker::{ChunkResult, ChunkWorker};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

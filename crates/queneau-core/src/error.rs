//! Error type shared by every stage of a scan.

use thiserror::Error;

/// Everything that can abort a scan, a prime-table load, or an aggregation.
///
/// All variants are terminal for the operation that produced them; nothing in
/// the crate retries.
#[derive(Error, Debug)]
pub enum QueneauError {
    #[error("invalid scan configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid prime table: {0}")]
    InvalidPrimeTable(String),

    #[error("not enough primes: largest prime {largest} must satisfy {largest}^2 > {required}")]
    InsufficientPrimes { largest: u64, required: u64 },

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("factorization of order {order} is inconsistent (tracked product {product})")]
    InconsistentFactors { order: u64, product: u64 },

    #[error("too many distinct prime factors recorded for n = {0}")]
    FactorCapacity(u64),

    #[error("worker thread panicked while processing chunk starting at {0}")]
    WorkerPanicked(u64),

    #[error("malformed count on line {line}: {text:?}")]
    MalformedCount { line: usize, text: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QueneauError>;

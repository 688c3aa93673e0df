//! Read-only table of small primes that drives every chunk sieve.
//!
//! The on-disk format is plain text: ascending primes separated by any
//! whitespace. A table is loaded (or generated) once per run and then shared
//! by reference with every worker; nothing mutates it after construction.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{QueneauError, Result};

/// Strictly ascending list of primes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeTable {
    primes: Vec<u64>,
}

impl PrimeTable {
    /// Wrap an existing list, checking that it is non-empty and strictly
    /// ascending. Primality of the entries is trusted.
    pub fn new(primes: Vec<u64>) -> Result<Self> {
        if primes.is_empty() {
            return Err(QueneauError::InvalidPrimeTable("table is empty".into()));
        }
        if primes[0] < 2 {
            return Err(QueneauError::InvalidPrimeTable(format!(
                "{} is not a prime",
                primes[0]
            )));
        }
        if let Some(w) = primes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(QueneauError::InvalidPrimeTable(format!(
                "entries not strictly ascending: {} then {}",
                w[0], w[1]
            )));
        }
        Ok(Self { primes })
    }

    /// Parse the whitespace-separated text format.
    pub fn parse(text: &str) -> Result<Self> {
        let primes = text
            .split_whitespace()
            .map(|tok| {
                tok.parse::<u64>().map_err(|_| {
                    QueneauError::InvalidPrimeTable(format!("{tok:?} is not an integer"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(primes)
    }

    /// Load a table from a text file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let table = Self::parse(&text)?;
        log::info!(
            "loaded {} primes from {} (largest {})",
            table.len(),
            path.display(),
            table.largest()
        );
        Ok(table)
    }

    /// All primes `<= limit`, by a plain sieve of Eratosthenes.
    ///
    /// Returns an empty-table error when `limit < 2`.
    pub fn sieve_up_to(limit: u64) -> Result<Self> {
        if limit < 2 {
            return Err(QueneauError::InvalidPrimeTable(format!(
                "no primes below {limit}"
            )));
        }
        let size = usize::try_from(limit)
            .ok()
            .and_then(|l| l.checked_add(1))
            .ok_or(QueneauError::Overflow("prime sieve size"))?;
        let mut composite = vec![false; size];
        let mut p = 2usize;
        while p * p < size {
            if !composite[p] {
                for m in (p * p..size).step_by(p) {
                    composite[m] = true;
                }
            }
            p += 1;
        }
        let primes = (2..size)
            .filter(|&i| !composite[i])
            .map(|i| i as u64)
            .collect();
        Self::new(primes)
    }

    /// Smallest generated table whose largest prime `p` satisfies
    /// `p^2 > 2 * stop + 1`.
    pub fn for_range(stop: u64) -> Result<Self> {
        let required = required_bound(stop)?;
        let mut limit = required.isqrt().max(2);
        loop {
            let table = Self::sieve_up_to(limit)?;
            if table.covers(stop) {
                log::debug!("generated {} primes up to {limit}", table.len());
                return Ok(table);
            }
            limit = limit
                .checked_add(limit / 16 + 16)
                .ok_or(QueneauError::Overflow("prime sieve limit"))?;
        }
    }

    /// Write the table in the whitespace format (single spaces, trailing newline).
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        let mut first = true;
        for p in &self.primes {
            if first {
                write!(out, "{p}")?;
                first = false;
            } else {
                write!(out, " {p}")?;
            }
        }
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.primes
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    /// Largest prime in the table.
    pub fn largest(&self) -> u64 {
        // Non-empty by construction.
        self.primes[self.primes.len() - 1]
    }

    /// Number of primes `<= bound`.
    pub fn count_up_to(&self, bound: u64) -> usize {
        self.primes.partition_point(|&p| p <= bound)
    }

    /// Whether `largest^2 > 2 * stop + 1`.
    pub fn covers(&self, stop: u64) -> bool {
        match required_bound(stop) {
            Ok(required) => (self.largest() as u128).pow(2) > required as u128,
            Err(_) => false,
        }
    }

    /// Startup check: fail unless the table can sieve a scan ending at `stop`.
    pub fn ensure_covers(&self, stop: u64) -> Result<()> {
        let required = required_bound(stop)?;
        if self.covers(stop) {
            Ok(())
        } else {
            Err(QueneauError::InsufficientPrimes {
                largest: self.largest(),
                required,
            })
        }
    }
}

/// `2 * stop + 1`, the bound a table's largest square must exceed.
fn required_bound(stop: u64) -> Result<u64> {
    stop.checked_mul(2)
        .and_then(|v| v.checked_add(1))
        .ok_or(QueneauError::Overflow("2 * stop + 1"))
}

//! One unit of parallel work: sieve a chunk, then test every survivor.

use crate::error::Result;
use crate::primes::PrimeTable;
use crate::root::is_queneau;
use crate::sieve::ChunkSieve;

/// Verdicts for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    /// First `n` covered by the chunk.
    pub chunk_min: u64,
    /// Number of `true` entries in `verdicts`.
    pub count: u64,
    /// `verdicts[j]` is true iff `chunk_min + j` is a Queneau number.
    pub verdicts: Vec<bool>,
}

impl ChunkResult {
    /// Exclusive end of the chunk.
    pub fn chunk_end(&self) -> u64 {
        self.chunk_min + self.verdicts.len() as u64
    }

    /// Queneau numbers in the chunk, ascending.
    pub fn queneaus(&self) -> impl DoubleEndedIterator<Item = u64> + '_ {
        self.verdicts
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .map(move |(j, _)| self.chunk_min + j as u64)
    }
}

/// Runs the sieve and the root test for any chunk of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct ChunkWorker<'a> {
    sieve: ChunkSieve<'a>,
}

impl<'a> ChunkWorker<'a> {
    pub fn new(primes: &'a PrimeTable, chunk_size: u64) -> Result<Self> {
        Ok(Self {
            sieve: ChunkSieve::new(primes, chunk_size)?,
        })
    }

    pub fn chunk_size(&self) -> u64 {
        self.sieve.chunk_size()
    }

    /// Process `[chunk_min, chunk_min + chunk_size)`.
    pub fn process(&self, chunk_min: u64) -> Result<ChunkResult> {
        let outcome = self.sieve.sieve(chunk_min)?;
        let mut verdicts = outcome.candidates;
        let mut count = 0u64;
        for (j, verdict) in verdicts.iter_mut().enumerate() {
            if !*verdict {
                continue;
            }
            *verdict = is_queneau(chunk_min + j as u64, &outcome.factors[j])?;
            if *verdict {
                count += 1;
            }
        }
        log::debug!("chunk {chunk_min}: {count} Queneau numbers");
        Ok(ChunkResult {
            chunk_min,
            count,
            verdicts,
        })
    }
}

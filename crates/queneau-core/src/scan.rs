//! Parallel scan over a range of `n`, split into fixed-size chunks.
//!
//! Architecture:
//! 1. Validate the configuration and the prime table before any work starts
//! 2. Partition `[start, stop)` into `chunk_size` chunks
//! 3. Stripe chunk indices statically across a fixed pool of scoped threads
//! 4. Each thread runs whole chunks through a [`ChunkWorker`]
//! 5. Gather results into indexed slots, read back in chunk order
//! 6. Any failure aborts the batch; no partial result is returned

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{QueneauError, Result};
use crate::primes::PrimeTable;
use crate::worker::{ChunkResult, ChunkWorker};

/// Range and chunking parameters for one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// First `n` scanned.
    pub start: u64,
    /// One past the last `n` scanned.
    pub stop: u64,
    /// Width of every chunk; a positive multiple of 4 dividing `stop - start`.
    pub chunk_size: u64,
    /// Worker threads; `None` uses the available hardware parallelism.
    pub workers: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start: 0,
            stop: 2_000_000,
            chunk_size: 50_000,
            workers: None,
        }
    }
}

impl ScanConfig {
    pub fn new(start: u64, stop: u64, chunk_size: u64) -> Self {
        Self {
            start,
            stop,
            chunk_size,
            workers: None,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Check the chunking constraints.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 || self.chunk_size % 4 != 0 {
            return Err(QueneauError::InvalidConfig(format!(
                "chunk size {} is not a positive multiple of 4",
                self.chunk_size
            )));
        }
        if self.stop < self.start {
            return Err(QueneauError::InvalidConfig(format!(
                "stop {} is below start {}",
                self.stop, self.start
            )));
        }
        if (self.stop - self.start) % self.chunk_size != 0 {
            return Err(QueneauError::InvalidConfig(format!(
                "range {}..{} is not a whole number of {}-wide chunks",
                self.start, self.stop, self.chunk_size
            )));
        }
        if self.stop.checked_mul(2).and_then(|v| v.checked_add(1)).is_none() {
            return Err(QueneauError::InvalidConfig(format!(
                "2 * {} + 1 does not fit in 64 bits",
                self.stop
            )));
        }
        if self.workers == Some(0) {
            return Err(QueneauError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of chunks in the range.
    pub fn chunk_count(&self) -> u64 {
        (self.stop - self.start) / self.chunk_size
    }

    /// First `n` of every chunk, in order.
    pub fn chunk_starts(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.chunk_count()).map(|i| self.start + i * self.chunk_size)
    }

    /// Threads actually used: the configured or detected count, never more
    /// than there are chunks, never fewer than one.
    pub fn worker_count(&self) -> usize {
        let wanted = self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        let chunks = usize::try_from(self.chunk_count()).unwrap_or(usize::MAX);
        wanted.min(chunks).max(1)
    }
}

/// Scan the configured range and return one [`ChunkResult`] per chunk, in
/// chunk order.
///
/// Fails before dispatching anything if the configuration is invalid or the
/// prime table cannot cover `stop`. If any chunk fails (or its worker panics)
/// the remaining workers stop at their next chunk and the error of the
/// lowest-indexed failing chunk is returned.
pub fn scan(config: &ScanConfig, primes: &PrimeTable) -> Result<Vec<ChunkResult>> {
    config.validate()?;
    primes.ensure_covers(config.stop)?;

    let worker = ChunkWorker::new(primes, config.chunk_size)?;
    let nchunks = usize::try_from(config.chunk_count())
        .map_err(|_| QueneauError::InvalidConfig("too many chunks".into()))?;
    if nchunks == 0 {
        return Ok(Vec::new());
    }
    let workers = config.worker_count();
    log::info!(
        "scanning [{}, {}) as {nchunks} chunks of {} on {workers} workers",
        config.start,
        config.stop,
        config.chunk_size
    );

    let abort = AtomicBool::new(false);
    let start = config.start;
    let chunk_size = config.chunk_size;

    let batches: Vec<Vec<(usize, Result<ChunkResult>)>> = std::thread::scope(|s| {
        let abort = &abort;
        let handles: Vec<_> = (0..workers)
            .map(|w| {
                s.spawn(move || {
                    let mut out = Vec::new();
                    for idx in (w..nchunks).step_by(workers) {
                        if abort.load(Ordering::Relaxed) {
                            break;
                        }
                        let chunk_min = start + idx as u64 * chunk_size;
                        let result = catch_unwind(AssertUnwindSafe(|| worker.process(chunk_min)))
                            .unwrap_or(Err(QueneauError::WorkerPanicked(chunk_min)));
                        let failed = result.is_err();
                        out.push((idx, result));
                        if failed {
                            abort.store(true, Ordering::Relaxed);
                            break;
                        }
                    }
                    out
                })
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(w, handle)| {
                handle.join().unwrap_or_else(|_| {
                    let chunk_min = start + w as u64 * chunk_size;
                    vec![(w, Err(QueneauError::WorkerPanicked(chunk_min)))]
                })
            })
            .collect()
    });

    let mut slots: Vec<Option<ChunkResult>> = vec![None; nchunks];
    let mut first_error: Option<(usize, QueneauError)> = None;
    for (idx, result) in batches.into_iter().flatten() {
        match result {
            Ok(r) => slots[idx] = Some(r),
            Err(e) => {
                if first_error.as_ref().is_none_or(|(i, _)| idx < *i) {
                    first_error = Some((idx, e));
                }
            }
        }
    }
    if let Some((idx, e)) = first_error {
        log::warn!("scan aborted at chunk {idx}: {e}");
        return Err(e);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            slot.ok_or(QueneauError::WorkerPanicked(start + idx as u64 * chunk_size))
        })
        .collect()
}

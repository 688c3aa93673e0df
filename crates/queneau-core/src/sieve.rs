//! Per-chunk candidate sieve with incremental factorization of orders.
//!
//! A chunk covers `n` in `[chunk_min, chunk_min + chunk_size)`. Each offset
//! `j` stands for the odd modulus `N = 2(chunk_min + j) + 1` and the order
//! `2(chunk_min + j)`. Two strided passes run over the chunk:
//!
//! 1. **Elimination**: every `N` with a prime factor up to `sqrt(N_max)`
//!    (other than `N` itself) is struck, together with every `n ≡ 0 (mod 4)`.
//! 2. **Factor counting**: for each survivor, the small prime factors of its
//!    order are recorded with multiplicity in a [`FactorMap`].
//!
//! Whatever part of the order is not accounted for by the factor map is a
//! single large prime, which the root test recovers by division.

use crate::arith::offset_to_multiple;
use crate::error::{QueneauError, Result};
use crate::primes::PrimeTable;

/// Most distinct primes a `u64` order can have (2·3·5·…·47 < 2^64 < 2·3·…·53).
pub const MAX_DISTINCT_FACTORS: usize = 15;

// ---------------------------------------------------------------------------
// Factor map
// ---------------------------------------------------------------------------

/// Fixed-capacity prime → multiplicity map for one order.
///
/// Primes are kept in insertion order, which is ascending because the sieve
/// walks the prime table in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactorMap {
    primes: [u64; MAX_DISTINCT_FACTORS],
    exponents: [u8; MAX_DISTINCT_FACTORS],
    len: u8,
}

impl FactorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more power of `prime`: inserted with multiplicity 1 on first
    /// sight, incremented afterwards. Returns `false` when the map is full.
    pub fn record(&mut self, prime: u64) -> bool {
        let len = self.len as usize;
        if let Some(i) = self.primes[..len].iter().position(|&p| p == prime) {
            self.exponents[i] = self.exponents[i].saturating_add(1);
            return true;
        }
        if len == MAX_DISTINCT_FACTORS {
            return false;
        }
        self.primes[len] = prime;
        self.exponents[len] = 1;
        self.len += 1;
        true
    }

    /// Multiplicity of `prime` (0 if absent).
    pub fn multiplicity(&self, prime: u64) -> u8 {
        self.iter()
            .find(|&(p, _)| p == prime)
            .map_or(0, |(_, e)| e)
    }

    /// Distinct primes recorded so far.
    pub fn primes(&self) -> &[u64] {
        &self.primes[..self.len as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, u8)> + '_ {
        self.primes()
            .iter()
            .copied()
            .zip(self.exponents[..self.len as usize].iter().copied())
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Product of all recorded prime powers, `None` on overflow.
    pub fn product(&self) -> Option<u64> {
        self.iter()
            .try_fold(1u64, |acc, (p, e)| acc.checked_mul(p.checked_pow(e as u32)?))
    }
}

impl FromIterator<(u64, u8)> for FactorMap {
    /// Build a map from `(prime, multiplicity)` pairs. Entries past capacity are dropped.
    fn from_iter<I: IntoIterator<Item = (u64, u8)>>(iter: I) -> Self {
        let mut map = FactorMap::new();
        for (p, e) in iter {
            for _ in 0..e {
                if !map.record(p) {
                    return map;
                }
            }
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Chunk sieve
// ---------------------------------------------------------------------------

/// Output of [`ChunkSieve::sieve`]: survivors and the factorization of their orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SieveOutcome {
    /// `true` = still a candidate.
    pub candidates: Vec<bool>,
    /// One map per offset; empty for eliminated offsets.
    pub factors: Vec<FactorMap>,
}

/// Sieve configured for one prime table and one fixed chunk size.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSieve<'a> {
    primes: &'a PrimeTable,
    chunk_size: u64,
}

impl<'a> ChunkSieve<'a> {
    /// `chunk_size` must be a positive multiple of 4.
    pub fn new(primes: &'a PrimeTable, chunk_size: u64) -> Result<Self> {
        if chunk_size == 0 || chunk_size % 4 != 0 {
            return Err(QueneauError::InvalidConfig(format!(
                "chunk size {chunk_size} is not a positive multiple of 4"
            )));
        }
        if usize::try_from(chunk_size).is_err() {
            return Err(QueneauError::InvalidConfig(format!(
                "chunk size {chunk_size} does not fit in memory"
            )));
        }
        Ok(Self { primes, chunk_size })
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn primes(&self) -> &'a PrimeTable {
        self.primes
    }

    /// `floor(sqrt(2 * (chunk_min + chunk_size) + 1))`.
    pub fn max_divisor(&self, chunk_min: u64) -> Result<u64> {
        Ok(upper_modulus(chunk_min, self.chunk_size)?.isqrt())
    }

    /// Sieve the chunk starting at `chunk_min`.
    pub fn sieve(&self, chunk_min: u64) -> Result<SieveOutcome> {
        let size = self.chunk_size as usize;
        let chunk_size = self.chunk_size;
        let mut candidates = vec![true; size];
        let mut factors = vec![FactorMap::new(); size];

        for j in (offset_to_multiple(chunk_min, 4)..chunk_size).step_by(4) {
            candidates[j as usize] = false;
        }

        let n_min = chunk_min
            .checked_mul(2)
            .and_then(|v| v.checked_add(1))
            .ok_or(QueneauError::Overflow("2 * chunk_min + 1"))?;
        let upper = upper_modulus(chunk_min, chunk_size)?;
        let max_divisor = upper.isqrt();
        let nprimes = self.primes.count_up_to(max_divisor);
        if nprimes == self.primes.len() {
            return Err(QueneauError::InsufficientPrimes {
                largest: self.primes.largest(),
                required: upper,
            });
        }
        let small = &self.primes.as_slice()[..nprimes];

        // Odd moduli only, so 2 never strikes anything here.
        for &p in small.iter().filter(|&&p| p > 2) {
            let mut offset = ((p - 1) / 2 + p - chunk_min % p) % p;
            if n_min <= p {
                offset += p;
            }
            for j in (offset..chunk_size).step_by(p as usize) {
                candidates[j as usize] = false;
            }
        }

        // Cannot overflow: upper_modulus succeeded.
        let chunk_end = chunk_min + chunk_size;
        for &q in small {
            let mut divisor = q;
            // Powers of 2 stop at 4: an order divisible by 8 has n ≡ 0 (mod 4).
            while divisor < chunk_end && divisor != 8 {
                // Orders are even, so 2^i | 2n exactly when 2^(i-1) | n.
                let stride = if q == 2 { divisor / 2 } else { divisor };
                let first = offset_to_multiple(chunk_min, stride);
                // No multiple of this power in the chunk, so none of any higher power.
                if first >= chunk_size {
                    break;
                }
                for j in (first..chunk_size).step_by(stride as usize) {
                    let j = j as usize;
                    if candidates[j] && !factors[j].record(q) {
                        return Err(QueneauError::FactorCapacity(chunk_min + j as u64));
                    }
                }
                divisor = match divisor.checked_mul(q) {
                    Some(d) => d,
                    None => break,
                };
            }
        }

        Ok(SieveOutcome {
            candidates,
            factors,
        })
    }
}

/// `2 * (chunk_min + chunk_size) + 1`.
fn upper_modulus(chunk_min: u64, chunk_size: u64) -> Result<u64> {
    chunk_min
        .checked_add(chunk_size)
        .and_then(|v| v.checked_mul(2))
        .and_then(|v| v.checked_add(1))
        .ok_or(QueneauError::Overflow("2 * (chunk_min + chunk_size) + 1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PrimeTable {
        PrimeTable::sieve_up_to(1000).unwrap()
    }

    fn survivors(outcome: &SieveOutcome, chunk_min: u64) -> Vec<u64> {
        outcome
            .candidates
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .map(|(j, _)| chunk_min + j as u64)
            .collect()
    }

    // -----------------------------------------------------------------------
    // FactorMap
    // -----------------------------------------------------------------------

    #[test]
    fn test_factor_map_record_and_increment() {
        let mut m = FactorMap::new();
        assert!(m.is_empty());
        assert!(m.record(2));
        assert!(m.record(3));
        assert!(m.record(3));
        assert_eq!(m.len(), 2);
        assert_eq!(m.multiplicity(2), 1);
        assert_eq!(m.multiplicity(3), 2);
        assert_eq!(m.multiplicity(5), 0);
        assert_eq!(m.primes(), &[2, 3]);
        assert_eq!(m.product(), Some(18));
    }

    #[test]
    fn test_factor_map_capacity() {
        let primes = [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47];
        let mut m = FactorMap::new();
        for p in primes {
            assert!(m.record(p));
        }
        assert_eq!(m.len(), MAX_DISTINCT_FACTORS);
        assert!(!m.record(53));
        // Existing entries can still grow.
        assert!(m.record(2));
        assert_eq!(m.multiplicity(2), 2);
    }

    #[test]
    fn test_factor_map_product_overflow() {
        let m: FactorMap = [(2u64, 63u8), (3, 1)].into_iter().collect();
        assert_eq!(m.product(), None);
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn test_chunk_size_must_be_multiple_of_four() {
        let t = table();
        assert!(ChunkSieve::new(&t, 0).is_err());
        assert!(ChunkSieve::new(&t, 10).is_err());
        assert!(ChunkSieve::new(&t, 20).is_ok());
    }

    #[test]
    fn test_max_divisor() {
        let t = table();
        let s = ChunkSieve::new(&t, 20).unwrap();
        // sqrt(41) = 6.4
        assert_eq!(s.max_divisor(0).unwrap(), 6);
        // sqrt(2 * 40 + 1) = 9 exactly
        assert_eq!(s.max_divisor(20).unwrap(), 9);
    }

    #[test]
    fn test_insufficient_primes_in_chunk() {
        let t = PrimeTable::parse("2 3 5").unwrap();
        let s = ChunkSieve::new(&t, 20).unwrap();
        // max_divisor for [0, 20) is 6: no prime above it in the table.
        assert!(matches!(
            s.sieve(0),
            Err(QueneauError::InsufficientPrimes { largest: 5, .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Elimination pass
    // -----------------------------------------------------------------------

    #[test]
    fn test_first_chunk_survivors() {
        let t = table();
        let out = ChunkSieve::new(&t, 20).unwrap().sieve(0).unwrap();
        // 2n+1 prime and n not divisible by 4.
        assert_eq!(survivors(&out, 0), vec![1, 2, 3, 5, 6, 9, 11, 14, 15, 18]);
    }

    #[test]
    fn test_second_chunk_survivors() {
        let t = table();
        let out = ChunkSieve::new(&t, 20).unwrap().sieve(20).unwrap();
        assert_eq!(
            survivors(&out, 20),
            vec![21, 23, 26, 29, 30, 33, 35, 39]
        );
    }

    #[test]
    fn test_small_primes_in_range_are_kept() {
        // N = 3, 5, 7 lie inside the first chunk and must not strike themselves.
        let t = table();
        let out = ChunkSieve::new(&t, 4).unwrap().sieve(0).unwrap();
        assert_eq!(out.candidates, vec![false, true, true, true]);
    }

    #[test]
    fn test_multiples_of_four_always_eliminated() {
        let t = table();
        let s = ChunkSieve::new(&t, 40).unwrap();
        for chunk_min in [0, 40, 120, 3, 17] {
            let out = s.sieve(chunk_min).unwrap();
            for (j, &c) in out.candidates.iter().enumerate() {
                if (chunk_min + j as u64) % 4 == 0 {
                    assert!(!c, "n = {} survived", chunk_min + j as u64);
                }
            }
        }
    }

    #[test]
    fn test_survivors_have_prime_modulus() {
        let t = table();
        let s = ChunkSieve::new(&t, 100).unwrap();
        for chunk_min in [0, 100, 1000, 5000] {
            let out = s.sieve(chunk_min).unwrap();
            for n in survivors(&out, chunk_min) {
                let big_n = 2 * n + 1;
                assert!(
                    (2..).take_while(|d| d * d <= big_n).all(|d| big_n % d != 0),
                    "{big_n} survived but is composite"
                );
            }
        }
    }

    // -----------------------------------------------------------------------
    // Factor-counting pass
    // -----------------------------------------------------------------------

    #[test]
    fn test_first_chunk_factors() {
        let t = table();
        let out = ChunkSieve::new(&t, 20).unwrap().sieve(0).unwrap();
        let f = |n: usize| out.factors[n].iter().collect::<Vec<_>>();
        assert_eq!(f(1), vec![(2, 1)]);
        assert_eq!(f(2), vec![(2, 2)]);
        assert_eq!(f(3), vec![(2, 1), (3, 1)]);
        assert_eq!(f(9), vec![(2, 1), (3, 2)]);
        assert_eq!(f(15), vec![(2, 1), (3, 1), (5, 1)]);
        assert_eq!(f(18), vec![(2, 2), (3, 2)]);
        // Eliminated offsets carry no factors.
        assert!(out.factors[4].is_empty());
        assert!(out.factors[7].is_empty());
    }

    #[test]
    fn test_primes_above_bound_are_not_tracked() {
        // 2 * 23 = 46: 23 is above the sieving bound, so only the 2 is
        // recorded and the root test recovers 23 as the leftover cofactor.
        let t = table();
        let out = ChunkSieve::new(&t, 20).unwrap().sieve(20).unwrap();
        assert_eq!(out.factors[3].iter().collect::<Vec<_>>(), vec![(2, 1)]);
        assert_eq!(
            out.factors[1].iter().collect::<Vec<_>>(),
            vec![(2, 1), (3, 1), (7, 1)]
        );
    }

    #[test]
    fn test_primes_above_chunk_size_are_tracked() {
        let t = table();
        // n = 341 in [336, 344): order 682 = 2 * 11 * 31, bound sqrt(689) = 26.
        let out = ChunkSieve::new(&t, 8).unwrap().sieve(336).unwrap();
        assert!(out.candidates[5]);
        assert_eq!(
            out.factors[5].iter().collect::<Vec<_>>(),
            vec![(2, 1), (11, 1)]
        );
        // n = 75 in [72, 76): order 150 = 2 * 3 * 5^2, both powers of 5 recorded.
        let out = ChunkSieve::new(&t, 4).unwrap().sieve(72).unwrap();
        assert!(out.candidates[3]);
        assert_eq!(
            out.factors[3].iter().collect::<Vec<_>>(),
            vec![(2, 1), (3, 1), (5, 2)]
        );
    }

    #[test]
    fn test_powers_of_two_capped_at_four() {
        // Orders with 2^4 or more (n ≡ 0 mod 8) never get a factor map, since
        // the mod-4 pass removes them first; n ≡ 2 (mod 4) records exactly 2^2
        // and odd n exactly 2^1, however large the chunk is.
        let t = table();
        let out = ChunkSieve::new(&t, 400).unwrap().sieve(0).unwrap();
        for (j, m) in out.factors.iter().enumerate() {
            let n = j as u64;
            match n % 8 {
                0 | 4 => assert!(m.is_empty(), "n = {n} has factors"),
                2 | 6 if out.candidates[j] => assert_eq!(m.multiplicity(2), 2, "n = {n}"),
                _ if out.candidates[j] => assert_eq!(m.multiplicity(2), 1, "n = {n}"),
                _ => assert!(m.is_empty()),
            }
        }
    }

    #[test]
    fn test_unaligned_chunk_start_tracks_two() {
        // chunk_min odd: offset 0 is an odd n whose order still has a factor 2.
        let t = table();
        let out = ChunkSieve::new(&t, 20).unwrap().sieve(1).unwrap();
        assert!(out.candidates[0]);
        assert_eq!(out.factors[0].multiplicity(2), 1);
        // n = 2 at offset 1: order 4.
        assert_eq!(out.factors[1].multiplicity(2), 2);
    }

    #[test]
    fn test_sieve_is_deterministic() {
        let t = table();
        let s = ChunkSieve::new(&t, 200).unwrap();
        assert_eq!(s.sieve(1000).unwrap(), s.sieve(1000).unwrap());
    }
}

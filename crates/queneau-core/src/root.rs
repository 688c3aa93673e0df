//! Primitive-root test against `N = order + 1`, driven by the order's factorization.

use crate::arith::{pow_mod, reduce_signed};
use crate::error::{QueneauError, Result};
use crate::sieve::{FactorMap, MAX_DISTINCT_FACTORS};

/// `true` iff `a^(order/q) mod (order + 1) != 1` for every `q` in `factors`.
///
/// With the complete set of distinct prime factors of `order` and a prime
/// modulus this is exactly "`a` is a primitive root mod `order + 1`".
pub fn chk_prim_root(a: i64, order: u64, factors: &[u64]) -> bool {
    let modulus = order + 1;
    let base = reduce_signed(a, modulus);
    factors
        .iter()
        .all(|&q| pow_mod(base, order / q, modulus) != 1)
}

/// Distinct prime factors of `order`: the tracked ones plus, when the tracked
/// product falls short, the leftover cofactor taken as one more prime.
pub fn order_factors(order: u64, factor_map: &FactorMap) -> Result<Vec<u64>> {
    let product = factor_map
        .product()
        .ok_or(QueneauError::Overflow("tracked factor product"))?;
    if product == 0 || order % product != 0 {
        return Err(QueneauError::InconsistentFactors { order, product });
    }
    let mut factors = Vec::with_capacity(MAX_DISTINCT_FACTORS + 1);
    factors.extend_from_slice(factor_map.primes());
    if product != order {
        factors.push(order / product);
    }
    Ok(factors)
}

/// Whether `n` is a Queneau number, given the sieve's factor map for `2n`.
///
/// `n ≡ 0 (mod 4)` is rejected outright. Otherwise base 2 is tried first, and
/// base −2 only when `n ≡ 3 (mod 4)`.
pub fn is_queneau(n: u64, factor_map: &FactorMap) -> Result<bool> {
    if n % 4 == 0 {
        return Ok(false);
    }
    // Even, so 2n + 1 cannot overflow once 2n fits.
    let order = n.checked_mul(2).ok_or(QueneauError::Overflow("order 2n"))?;
    let factors = order_factors(order, factor_map)?;

    if chk_prim_root(2, order, &factors) {
        Ok(true)
    } else if n % 4 < 3 {
        Ok(false)
    } else {
        Ok(chk_prim_root(-2, order, &factors))
    }
}

//! Small modular-arithmetic helpers used by the sieve and the root test.

/// Modular exponentiation: `base^exp mod modulus`.
///
/// Uses u128 intermediates so any `u64` modulus is safe.
pub fn pow_mod(mut base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result: u64 = 1;
    base %= modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = (result as u128 * base as u128 % modulus as u128) as u64;
        }
        exp >>= 1;
        base = (base as u128 * base as u128 % modulus as u128) as u64;
    }
    result
}

/// Reduce a signed base into `[0, modulus)`.
pub fn reduce_signed(base: i64, modulus: u64) -> u64 {
    (base as i128).rem_euclid(modulus as i128) as u64
}

/// Distance from `value` up to the next multiple of `divisor` (0 if `divisor | value`).
pub fn offset_to_multiple(value: u64, divisor: u64) -> u64 {
    (divisor - value % divisor) % divisor
}

//! Fixed-point helpers on arbitrary precision integers
//!
//! All ratios are scaled by [`SCALE`] (10^18) and divided with truncation,
//! never rounded, so results stay bit-for-bit reproducible.

use crate::error::{PoolError, Result};
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Fixed-point scale for price ratios (10^18)
pub const SCALE: u64 = 1_000_000_000_000_000_000;

/// [`SCALE`] as a big integer
pub fn scale() -> BigUint {
    BigUint::from(SCALE)
}

/// Truncated fixed-point ratio `numerator * SCALE / denominator`
pub fn fixed_ratio(numerator: &BigUint, denominator: &BigUint) -> Result<BigUint> {
    if denominator.is_zero() {
        return Err(PoolError::DivisionByZero("fixed-point ratio"));
    }
    Ok(numerator * scale() / denominator)
}

/// Floor of the square root of `n`
///
/// Narrows a bracket seeded from the bit length of `n` until both ends meet.
/// Always satisfies `isqrt(n)^2 <= n < (isqrt(n) + 1)^2`.
pub fn isqrt(n: &BigUint) -> BigUint {
    if *n < BigUint::from(2u8) {
        return n.clone();
    }

    let bits = (n.bits() + 1) / 2;
    let mut start = BigUint::one() << (bits - 1);
    let mut end = BigUint::one() << (bits + 1);
    while start < end {
        end = (&start + &end) >> 1u32;
        start = n / &end;
    }
    end
}

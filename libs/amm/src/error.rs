//! Error types for pool operations
//!
//! Every failing operation leaves the pool untouched, so callers can match on
//! the variant and retry with different inputs.

use crate::pool::Side;
use num_bigint::BigUint;
use thiserror::Error;

/// Errors returned by [`crate::LiquidityPool`] operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Rebalanced deposit does not match the pool ratio exactly
    #[error("Asymmetric deposit: deposit ratio {candidate} does not match pool ratio {expected}")]
    AsymmetricDeposit { candidate: BigUint, expected: BigUint },

    /// Input rejected before any arithmetic ran
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Denominator evaluated to zero
    #[error("Division by zero while computing {0}")]
    DivisionByZero(&'static str),

    /// Amount must be strictly positive
    #[error("Cannot input a zero amount")]
    ZeroAmount,

    /// Bid and ask name the same reserve
    #[error("Bid and ask sides must differ (both are {0})")]
    SameSide(Side),

    /// Operation would leave a reserve at zero or below
    #[error("Operation would deplete reserve {0}")]
    ReserveDepleted(Side),

    /// Pool is frozen; mutating operations are rejected
    #[error("Frozen pool")]
    Frozen,

    /// Swap output fell below the caller's minimum
    #[error("Exceed limit: amount out {amount_out} is below minimum {limit}")]
    ExceedLimit { amount_out: BigUint, limit: BigUint },

    /// Fixed-point value does not fit a 96-bit decimal mantissa
    #[error("Price ratio {0} does not fit in a Decimal")]
    DecimalOverflow(BigUint),

    /// Side label could not be parsed
    #[error("Unknown pool side '{0}' (expected A or B)")]
    InvalidSide(String),
}

/// Result alias for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asymmetric_deposit_display() {
        let err = PoolError::AsymmetricDeposit {
            candidate: BigUint::from(200_266_725_939_097_577u64),
            expected: BigUint::from(200_000_000_000_000_000u64),
        };
        let display = format!("{}", err);
        assert!(display.contains("Asymmetric deposit"));
        assert!(display.contains("200266725939097577"));
        assert!(display.contains("200000000000000000"));
    }

    #[test]
    fn test_side_errors_name_the_side() {
        assert_eq!(
            PoolError::SameSide(Side::A).to_string(),
            "Bid and ask sides must differ (both are A)"
        );
        assert_eq!(
            PoolError::ReserveDepleted(Side::B).to_string(),
            "Operation would deplete reserve B"
        );
    }
}

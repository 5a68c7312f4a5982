//! Fee and tax schedule applied to swap output
//!
//! Both ratios are fixed-point fractions of [`SCALE`]. The fee is taken
//! first and stays in the pool; the tax is taken from what remains and is
//! paid out alongside the trade.

use crate::error::{PoolError, Result};
use crate::math::{scale, SCALE};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Swap fee configuration (fractions of 10^18)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// Share of curve output retained by the pool
    pub fee_ratio: u64,
    /// Share of post-fee output routed to the tax collector
    pub tax_ratio: u64,
}

/// Breakdown of a curve output after fees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSplit {
    pub amount: BigUint,
    pub fee: BigUint,
    pub tax: BigUint,
}

impl FeeSchedule {
    /// Schedule that charges nothing
    pub const ZERO: Self = Self {
        fee_ratio: 0,
        tax_ratio: 0,
    };

    pub fn new(fee_ratio: u64, tax_ratio: u64) -> Result<Self> {
        let schedule = Self {
            fee_ratio,
            tax_ratio,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Ratios above 100% would make the output negative
    pub fn validate(&self) -> Result<()> {
        if self.fee_ratio > SCALE {
            return Err(PoolError::InvalidArgument(format!(
                "fee ratio {} exceeds {}",
                self.fee_ratio, SCALE
            )));
        }
        if self.tax_ratio > SCALE {
            return Err(PoolError::InvalidArgument(format!(
                "tax ratio {} exceeds {}",
                self.tax_ratio, SCALE
            )));
        }
        Ok(())
    }

    pub fn is_zero(&self) -> bool {
        self.fee_ratio == 0 && self.tax_ratio == 0
    }

    /// Split `gross` into trader amount, pool fee and tax
    pub fn apply(&self, gross: &BigUint) -> FeeSplit {
        let fee = BigUint::from(self.fee_ratio) * gross / scale();
        let after_fee = gross - &fee;
        let tax = BigUint::from(self.tax_ratio) * &after_fee / scale();
        let amount = after_fee - &tax;
        FeeSplit { amount, fee, tax }
    }
}

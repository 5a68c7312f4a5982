//! Swap pricing curves
//!
//! `ScaledAlpha` is the historical pricing rule: it scales the ask reserve by
//! `SCALE / (2*SCALE - alpha)` where `alpha` is the old-to-new bid reserve
//! ratio. It approximates `x*y=k` and, away from rounding edges, pays out
//! less than the exact invariant. `ConstantProduct` solves `x*y=k` directly.

use crate::error::{PoolError, Result};
use crate::math::scale;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Pricing rule used by [`crate::LiquidityPool::swap`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// `new_ask = prev_ask * SCALE / (2*SCALE - prev_bid*SCALE/new_bid)`
    #[default]
    ScaledAlpha,
    /// `new_ask = prev_bid * prev_ask / new_bid`
    ConstantProduct,
}

/// Reserves after a curve evaluation, before fees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveQuote {
    pub new_bid: BigUint,
    pub new_ask: BigUint,
    /// `prev_ask - new_ask`
    pub amount_out: BigUint,
}

impl CurveKind {
    pub fn quote(
        &self,
        prev_bid: &BigUint,
        prev_ask: &BigUint,
        amount_in: &BigUint,
    ) -> Result<CurveQuote> {
        let new_bid = prev_bid + amount_in;
        if new_bid.is_zero() {
            return Err(PoolError::DivisionByZero("new bid reserve"));
        }

        let new_ask = match self {
            CurveKind::ScaledAlpha => {
                let alpha = prev_bid * scale() / &new_bid;
                let two_scale = scale() << 1u32;
                if alpha >= two_scale {
                    return Err(PoolError::DivisionByZero("2*SCALE - alpha"));
                }
                prev_ask * scale() / (two_scale - alpha)
            }
            CurveKind::ConstantProduct => prev_bid * prev_ask / &new_bid,
        };

        // Both curves only ever shrink the ask side
        let amount_out = prev_ask - &new_ask;
        Ok(CurveQuote {
            new_bid,
            new_ask,
            amount_out,
        })
    }
}

impl std::fmt::Display for CurveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurveKind::ScaledAlpha => write!(f, "scaled_alpha"),
            CurveKind::ConstantProduct => write!(f, "constant_product"),
        }
    }
}

//! Diagnostic hooks for pool arithmetic
//!
//! The pool reports intermediate ratios through a [`PoolObserver`] instead of
//! writing to stdout. Hosts pick the sink: [`TracingObserver`] (the default)
//! forwards to `tracing`, [`NoopObserver`] discards everything.

use crate::pool::{DepositOutcome, Side, SwapOutcome};
use num_bigint::BigUint;
use tracing::debug;

/// Receives intermediate values from pool operations
pub trait PoolObserver: Send + Sync {
    /// Called by every ratio check with the candidate and pool ratios
    fn on_ratio_check(&self, candidate: &BigUint, expected: &BigUint);

    /// Called after a deposit has been rebalanced, before the symmetry check
    fn on_deposit_rebalance(&self, _outcome: &DepositOutcome) {}

    /// Called after a swap has been committed
    fn on_swap(&self, _bid: Side, _ask: Side, _outcome: &SwapOutcome) {}
}

/// Forwards observations to `tracing` at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PoolObserver for TracingObserver {
    fn on_ratio_check(&self, candidate: &BigUint, expected: &BigUint) {
        debug!(%candidate, %expected, matches = candidate == expected, "Liquidity ratio check");
    }

    fn on_deposit_rebalance(&self, outcome: &DepositOutcome) {
        debug!(
            a_star = %outcome.a_star,
            b_star = %outcome.b_star,
            adjusted_reserve_a = %outcome.adjusted_reserve_a,
            adjusted_reserve_b = %outcome.adjusted_reserve_b,
            "Deposit rebalanced"
        );
    }

    fn on_swap(&self, bid: Side, ask: Side, outcome: &SwapOutcome) {
        debug!(
            %bid,
            %ask,
            amount_out = %outcome.amount_out,
            fee = %outcome.fee,
            tax = %outcome.tax,
            "Swap executed"
        );
    }
}

/// Discards all observations
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PoolObserver for NoopObserver {
    fn on_ratio_check(&self, _candidate: &BigUint, _expected: &BigUint) {}
}

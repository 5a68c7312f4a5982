//! End-to-end pool scenarios
//!
//! Drives `LiquidityPool` through the public API with known reference values
//! and checks the diagnostics reported through a recording observer.

use amm_pool::{
    AmmSettings, BigInt, BigUint, CurveKind, DepositOutcome, DepositPolicy, FeeSchedule,
    LiquidityPool, NoopObserver, PoolError, PoolObserver, Side, SwapOutcome, SCALE,
};
use std::sync::{Arc, Mutex};

fn big(v: u64) -> BigUint {
    BigUint::from(v)
}

fn reference_pool() -> LiquidityPool {
    LiquidityPool::new(1_000_000_000u64, 5_000_000_000u64).unwrap()
}

/// Observer that records every ratio check and swap
#[derive(Default)]
struct RecordingObserver {
    ratio_checks: Mutex<Vec<(BigUint, BigUint)>>,
    rebalances: Mutex<Vec<DepositOutcome>>,
    swaps: Mutex<Vec<(Side, Side, BigUint)>>,
}

impl PoolObserver for RecordingObserver {
    fn on_ratio_check(&self, candidate: &BigUint, expected: &BigUint) {
        self.ratio_checks
            .lock()
            .unwrap()
            .push((candidate.clone(), expected.clone()));
    }

    fn on_deposit_rebalance(&self, outcome: &DepositOutcome) {
        self.rebalances.lock().unwrap().push(outcome.clone());
    }

    fn on_swap(&self, bid: Side, ask: Side, outcome: &SwapOutcome) {
        self.swaps
            .lock()
            .unwrap()
            .push((bid, ask, outcome.amount_out.clone()));
    }
}

#[test]
fn test_reference_swap_sequence() {
    let mut pool = reference_pool();
    let prev_ask = pool.reserve(Side::A).clone();

    let out = pool.swap(&big(1_000_000), Side::B, Side::A).unwrap();

    assert_eq!(pool.reserve(Side::B), &big(5_001_000_000));
    assert!(out > BigUint::from(0u32));
    assert!(out < prev_ask);
    assert_eq!(out, &prev_ask - pool.reserve(Side::A));

    // Swapping back moves the price the other way
    let ratio_after_first = pool.price_ratio();
    let back = pool.swap(&out, Side::A, Side::B).unwrap();
    assert!(back < big(1_000_000));
    assert!(pool.price_ratio() > ratio_after_first);
}

#[test]
fn test_reference_deposit_reports_rebalanced_ratio() {
    let observer = Arc::new(RecordingObserver::default());
    let mut pool = reference_pool().with_observer(observer.clone());

    let err = pool.add_liquidity(&big(1_000), &big(4_000)).unwrap_err();
    assert!(matches!(err, PoolError::AsymmetricDeposit { .. }));

    let rebalances = observer.rebalances.lock().unwrap();
    assert_eq!(rebalances.len(), 1);
    assert_eq!(rebalances[0].a_hat, BigInt::from(99));
    assert_eq!(rebalances[0].b_hat, BigInt::from(499));
    assert_eq!(rebalances[0].a_star, BigInt::from(901));
    assert_eq!(rebalances[0].b_star, BigInt::from(4_499));
    assert_eq!(rebalances[0].adjusted_reserve_a, BigInt::from(1_000_000_099u64));
    assert_eq!(rebalances[0].adjusted_reserve_b, BigInt::from(4_999_999_501u64));

    // The symmetry check ran on the rebalanced amounts, not the raw ones
    let checks = observer.ratio_checks.lock().unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].0, big(901) * big(SCALE) / big(4_499));
    assert_eq!(checks[0].1, big(200_000_000_000_000_000));

    assert_eq!(pool.reserves(), (&big(1_000_000_000), &big(5_000_000_000)));
}

#[test]
fn test_deposit_accepted_within_truncation() {
    // a/b differs from 1 by 10^-19, below the fixed-point resolution
    let reserve = BigUint::from(10u32).pow(30);
    let mut pool = LiquidityPool::new(reserve.clone(), reserve).unwrap();
    let b = BigUint::from(10u32).pow(19);
    let a = &b + 1u32;

    let outcome = pool.add_liquidity_detailed(&a, &b).unwrap();
    assert_eq!(outcome.a_hat, BigInt::from(0));
    assert_eq!(outcome.b_hat, BigInt::from(0));
    assert_eq!(outcome.liquidity, b);
}

#[test]
fn test_commit_policy_applies_nonzero_correction() {
    let mut pool = LiquidityPool::new(3u64, 6_056_941_974u64).unwrap();
    pool.set_deposit_policy(DepositPolicy::Commit);

    let outcome = pool
        .add_liquidity_detailed(&big(1_947_441_476), &big(3_931_846_668_593_009_890))
        .unwrap();

    assert_eq!(outcome.a_hat, BigInt::from(0));
    assert_eq!(outcome.b_hat, BigInt::from(3));
    assert_eq!(outcome.liquidity, big(87_504_521_481_409));
    assert!(outcome.committed);
    assert_eq!(pool.reserves(), (&big(3), &big(6_056_941_971)));
}

#[test]
fn test_verify_policy_never_moves_reserves() {
    let mut pool = LiquidityPool::new(3u64, 6_056_941_974u64).unwrap();
    let liquidity = pool
        .add_liquidity(&big(1_947_441_476), &big(3_931_846_668_593_009_890))
        .unwrap();

    assert_eq!(liquidity, big(87_504_521_481_409));
    assert_eq!(pool.reserves(), (&big(3), &big(6_056_941_974)));
}

#[test]
fn test_swap_notifies_observer() {
    let observer = Arc::new(RecordingObserver::default());
    let mut pool = reference_pool().with_observer(observer.clone());

    pool.swap(&big(1_000_000), Side::B, Side::A).unwrap();
    let _ = pool.swap(&big(1), Side::A, Side::A);

    let swaps = observer.swaps.lock().unwrap();
    assert_eq!(swaps.as_slice(), &[(Side::B, Side::A, big(199_921))]);
}

#[test]
fn test_without_observer_still_computes() {
    let mut pool = reference_pool().without_observer();
    assert!(pool.check_liquidity_ratio(&big(2), &big(10)).unwrap());
    assert_eq!(pool.add_liquidity(&big(2), &big(10)).unwrap(), big(4));
}

#[test]
fn test_noop_observer_replaces_default() {
    let mut pool = reference_pool().with_observer(Arc::new(NoopObserver));
    assert_eq!(pool.swap(&big(1_000_000), Side::B, Side::A).unwrap(), big(199_921));
    assert!(format!("{:?}", pool).contains("observed: true"));
}

#[test]
fn test_pool_from_settings() {
    let settings = AmmSettings::from_toml_str(
        r#"
        [pool]
        curve = "constant_product"

        [pool.fees]
        fee_ratio = 10000000000000000
        "#,
    )
    .unwrap();

    let mut pool =
        LiquidityPool::with_config(1_000_000_000u64, 5_000_000_000u64, &settings.pool).unwrap();
    assert_eq!(pool.curve(), CurveKind::ConstantProduct);
    assert_eq!(pool.fees(), FeeSchedule::new(10_000_000_000_000_000, 0).unwrap());

    let outcome = pool.swap_detailed(&big(1_000_000), Side::B, Side::A).unwrap();
    // exact invariant gives 199_961, 1% fee of that is 1_999
    assert_eq!(outcome.fee, big(1_999));
    assert_eq!(outcome.amount_out, big(197_962));
    assert_eq!(pool.reserve(Side::A), &big(999_800_039 + 1_999));
}

#[test]
fn test_snapshot_serializes_to_json() {
    let pool = reference_pool();
    let json = serde_json::to_value(pool.snapshot()).unwrap();
    assert_eq!(json["reserve_a"], "1000000000");
    assert_eq!(json["price_ratio"], "200000000000000000");
    assert_eq!(json["status"], "active");
    assert_eq!(json["curve"], "scaled_alpha");
    assert_eq!(json["deposit_policy"], "verify");
}

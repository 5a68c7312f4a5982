//! # AMM Pool - Constant-Product Pricing on Exact Integers
//!
//! ## Purpose
//!
//! Pricing primitive for a single two-token liquidity pool: construction,
//! swaps, and liquidity deposits with a symmetry check. All arithmetic runs on
//! arbitrary precision integers with a fixed-point scale of 10^18, so results
//! are reproducible to the last truncated digit.
//!
//! ## Integration Points
//!
//! - **Input**: reserve and deposit amounts as [`BigUint`]
//! - **Output**: swap and deposit outcomes, [`PoolError`] on rejection
//! - **Diagnostics**: [`PoolObserver`] hooks, `tracing` events at debug level
//! - **Configuration**: [`AmmSettings`] / [`PoolConfig`] from TOML and `AMM_*` env vars
//!
//! ## Usage
//!
//! ```rust
//! use amm_pool::{BigUint, LiquidityPool, Side};
//!
//! let mut pool = LiquidityPool::new(1_000_000_000u64, 5_000_000_000u64).unwrap();
//! let out = pool.swap(&BigUint::from(1_000_000u64), Side::B, Side::A).unwrap();
//! assert_eq!(out, BigUint::from(199_921u64));
//! ```
//!
//! ## Concurrency
//!
//! Operations take `&mut self` and run to completion. Hosts that share a pool
//! across threads wrap it in their own lock.

pub mod config;
pub mod curve;
pub mod error;
pub mod fees;
pub mod math;
pub mod observer;
pub mod pool;

pub use config::{AmmSettings, PoolConfig};
pub use curve::{CurveKind, CurveQuote};
pub use error::{PoolError, Result};
pub use fees::{FeeSchedule, FeeSplit};
pub use math::{fixed_ratio, isqrt, SCALE};
pub use observer::{NoopObserver, PoolObserver, TracingObserver};
pub use pool::{
    DepositOutcome, DepositPolicy, LiquidityPool, PoolSnapshot, PoolStatus, Side,
    SidedDepositQuote, SwapOutcome,
};

/// Common numeric types
pub use num_bigint::{BigInt, BigUint};
pub use rust_decimal::Decimal;

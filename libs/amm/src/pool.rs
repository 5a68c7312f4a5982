//! Two-token liquidity pool with arbitrary precision reserves
//!
//! The pool owns reserves `A` and `B` and mutates them in place. Every
//! operation computes its full result before touching state, so a failed call
//! leaves the pool exactly as it was.

use crate::config::PoolConfig;
use crate::curve::CurveKind;
use crate::error::{PoolError, Result};
use crate::fees::FeeSchedule;
use crate::math::{fixed_ratio, isqrt, scale, SCALE};
use crate::observer::{PoolObserver, TracingObserver};
use num_bigint::{BigInt, BigUint};
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One of the two pool reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

impl FromStr for Side {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A" | "a" => Ok(Side::A),
            "B" | "b" => Ok(Side::B),
            other => Err(PoolError::InvalidSide(other.to_string())),
        }
    }
}

/// Whether the pool accepts mutating operations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    #[default]
    Active,
    Frozen,
}

/// What `add_liquidity` does with the rebalanced reserves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositPolicy {
    /// Verify symmetry and mint shares; reserves stay untouched
    #[default]
    Verify,
    /// Also commit `reserve_a + a_hat` and `reserve_b - b_hat`
    Commit,
}

/// Result of a swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    /// Ask tokens delivered to the trader after fee and tax
    pub amount_out: BigUint,
    /// Retained in the ask reserve
    pub fee: BigUint,
    /// Paid out of the pool to the tax collector
    pub tax: BigUint,
    pub new_bid_reserve: BigUint,
    pub new_ask_reserve: BigUint,
}

/// Intermediate values of a deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    pub a_hat: BigInt,
    pub b_hat: BigInt,
    pub a_star: BigInt,
    pub b_star: BigInt,
    /// `isqrt(amount_a * amount_b)`
    pub liquidity: BigUint,
    /// `reserve_a + a_hat`
    pub adjusted_reserve_a: BigInt,
    /// `reserve_b - b_hat`
    pub adjusted_reserve_b: BigInt,
    /// True when the adjusted reserves were written back
    pub committed: bool,
}

/// Split of a one-token deposit into a swap leg and a kept leg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidedDepositQuote {
    /// Token the whole deposit is paid in
    pub side: Side,
    /// Sold for the opposite token
    pub swap_in: BigUint,
    /// Deposited as is
    pub retained: BigUint,
    /// The swap leg priced against the current reserves
    pub swap: SwapOutcome,
}

impl SidedDepositQuote {
    /// Deposit amounts ordered as `(A, B)`
    pub fn deposit_pair(&self) -> (&BigUint, &BigUint) {
        match self.side {
            Side::A => (&self.retained, &self.swap.amount_out),
            Side::B => (&self.swap.amount_out, &self.retained),
        }
    }
}

/// Serializable view of the pool for logs and tooling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub reserve_a: String,
    pub reserve_b: String,
    pub price_ratio: String,
    pub status: PoolStatus,
    pub curve: CurveKind,
    pub deposit_policy: DepositPolicy,
    pub fees: FeeSchedule,
}

/// Constant-product liquidity pool over two reserves
#[derive(Clone)]
pub struct LiquidityPool {
    reserve_a: BigUint,
    reserve_b: BigUint,
    status: PoolStatus,
    curve: CurveKind,
    fees: FeeSchedule,
    deposit_policy: DepositPolicy,
    observer: Option<Arc<dyn PoolObserver>>,
}

impl fmt::Debug for LiquidityPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiquidityPool")
            .field("reserve_a", &self.reserve_a)
            .field("reserve_b", &self.reserve_b)
            .field("status", &self.status)
            .field("curve", &self.curve)
            .field("fees", &self.fees)
            .field("deposit_policy", &self.deposit_policy)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl LiquidityPool {
    /// Create a pool from two strictly positive reserves
    pub fn new(reserve_a: impl Into<BigUint>, reserve_b: impl Into<BigUint>) -> Result<Self> {
        let reserve_a = reserve_a.into();
        let reserve_b = reserve_b.into();
        if reserve_a.is_zero() {
            return Err(PoolError::InvalidArgument(
                "reserve A must be positive".to_string(),
            ));
        }
        if reserve_b.is_zero() {
            return Err(PoolError::InvalidArgument(
                "reserve B must be positive".to_string(),
            ));
        }

        Ok(Self {
            reserve_a,
            reserve_b,
            status: PoolStatus::Active,
            curve: CurveKind::default(),
            fees: FeeSchedule::ZERO,
            deposit_policy: DepositPolicy::default(),
            observer: Some(Arc::new(TracingObserver)),
        })
    }

    /// Create a pool and apply curve, fees and deposit policy from config
    pub fn with_config(
        reserve_a: impl Into<BigUint>,
        reserve_b: impl Into<BigUint>,
        config: &PoolConfig,
    ) -> Result<Self> {
        config.fees.validate()?;
        let mut pool = Self::new(reserve_a, reserve_b)?;
        pool.curve = config.curve;
        pool.fees = config.fees;
        pool.deposit_policy = config.deposit_policy;
        Ok(pool)
    }

    pub fn with_observer(mut self, observer: Arc<dyn PoolObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn without_observer(mut self) -> Self {
        self.observer = None;
        self
    }

    pub fn reserve(&self, side: Side) -> &BigUint {
        match side {
            Side::A => &self.reserve_a,
            Side::B => &self.reserve_b,
        }
    }

    pub fn reserves(&self) -> (&BigUint, &BigUint) {
        (&self.reserve_a, &self.reserve_b)
    }

    pub fn status(&self) -> PoolStatus {
        self.status
    }

    pub fn is_frozen(&self) -> bool {
        self.status == PoolStatus::Frozen
    }

    pub fn curve(&self) -> CurveKind {
        self.curve
    }

    pub fn fees(&self) -> FeeSchedule {
        self.fees
    }

    pub fn deposit_policy(&self) -> DepositPolicy {
        self.deposit_policy
    }

    pub fn set_curve(&mut self, curve: CurveKind) {
        self.curve = curve;
    }

    pub fn set_fees(&mut self, fees: FeeSchedule) -> Result<()> {
        fees.validate()?;
        self.fees = fees;
        Ok(())
    }

    pub fn set_deposit_policy(&mut self, policy: DepositPolicy) {
        self.deposit_policy = policy;
    }

    /// Reject swaps and deposits until [`thaw`](Self::thaw)
    pub fn freeze(&mut self) {
        info!("Pool frozen");
        self.status = PoolStatus::Frozen;
    }

    pub fn thaw(&mut self) {
        info!("Pool thawed");
        self.status = PoolStatus::Active;
    }

    /// `reserve_a * SCALE / reserve_b`, truncated
    pub fn price_ratio(&self) -> BigUint {
        &self.reserve_a * scale() / &self.reserve_b
    }

    /// Price ratio as a decimal with 18 fractional digits
    pub fn price_decimal(&self) -> Result<Decimal> {
        let ratio = self.price_ratio();
        let scale_digits = SCALE.ilog10();
        ratio
            .to_i128()
            .and_then(|raw| Decimal::try_from_i128_with_scale(raw, scale_digits).ok())
            .ok_or(PoolError::DecimalOverflow(ratio))
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            reserve_a: self.reserve_a.to_string(),
            reserve_b: self.reserve_b.to_string(),
            price_ratio: self.price_ratio().to_string(),
            status: self.status,
            curve: self.curve,
            deposit_policy: self.deposit_policy,
            fees: self.fees,
        }
    }

    /// Compare `a * SCALE / b` with the pool ratio
    ///
    /// Both sides truncate, so this is an integer equality: two real-valued
    /// ratios that differ below 10^-18 compare equal, and values straddling a
    /// truncation boundary compare unequal.
    pub fn check_liquidity_ratio(&self, a: &BigUint, b: &BigUint) -> Result<bool> {
        let (candidate, expected) = self.ratio_pair(a, b)?;
        Ok(candidate == expected)
    }

    fn ratio_pair(&self, a: &BigUint, b: &BigUint) -> Result<(BigUint, BigUint)> {
        let candidate = fixed_ratio(a, b)?;
        let expected = self.price_ratio();
        if let Some(observer) = &self.observer {
            observer.on_ratio_check(&candidate, &expected);
        }
        Ok((candidate, expected))
    }

    /// Sell `amount_in` of `bid` for `ask`, returning the ask amount delivered
    pub fn swap(&mut self, amount_in: &BigUint, bid: Side, ask: Side) -> Result<BigUint> {
        self.swap_detailed(amount_in, bid, ask)
            .map(|outcome| outcome.amount_out)
    }

    pub fn swap_detailed(
        &mut self,
        amount_in: &BigUint,
        bid: Side,
        ask: Side,
    ) -> Result<SwapOutcome> {
        let outcome = self.quote_swap(amount_in, bid, ask)?;
        self.commit_swap(bid, ask, outcome)
    }

    /// Like [`swap_detailed`](Self::swap_detailed) but fails with
    /// `ExceedLimit` if the trader would receive less than `min_out`
    pub fn swap_with_limit(
        &mut self,
        amount_in: &BigUint,
        bid: Side,
        ask: Side,
        min_out: &BigUint,
    ) -> Result<SwapOutcome> {
        let outcome = self.quote_swap(amount_in, bid, ask)?;
        if outcome.amount_out < *min_out {
            warn!(
                amount_out = %outcome.amount_out,
                limit = %min_out,
                "Swap rejected by slippage limit"
            );
            return Err(PoolError::ExceedLimit {
                amount_out: outcome.amount_out,
                limit: min_out.clone(),
            });
        }
        self.commit_swap(bid, ask, outcome)
    }

    /// Price a swap without mutating the pool
    pub fn quote_swap(&self, amount_in: &BigUint, bid: Side, ask: Side) -> Result<SwapOutcome> {
        self.ensure_active()?;
        if bid == ask {
            return Err(PoolError::SameSide(bid));
        }
        if amount_in.is_zero() {
            return Err(PoolError::ZeroAmount);
        }

        let quote = self
            .curve
            .quote(self.reserve(bid), self.reserve(ask), amount_in)?;
        let split = self.fees.apply(&quote.amount_out);
        let new_ask_reserve = quote.new_ask + &split.fee;
        if new_ask_reserve.is_zero() {
            return Err(PoolError::ReserveDepleted(ask));
        }

        Ok(SwapOutcome {
            amount_out: split.amount,
            fee: split.fee,
            tax: split.tax,
            new_bid_reserve: quote.new_bid,
            new_ask_reserve,
        })
    }

    fn commit_swap(&mut self, bid: Side, ask: Side, outcome: SwapOutcome) -> Result<SwapOutcome> {
        *self.reserve_mut(bid) = outcome.new_bid_reserve.clone();
        *self.reserve_mut(ask) = outcome.new_ask_reserve.clone();
        debug!(
            reserve_a = %self.reserve_a,
            reserve_b = %self.reserve_b,
            curve = %self.curve,
            "Swap committed"
        );
        if let Some(observer) = &self.observer {
            observer.on_swap(bid, ask, &outcome);
        }
        Ok(outcome)
    }

    fn reserve_mut(&mut self, side: Side) -> &mut BigUint {
        match side {
            Side::A => &mut self.reserve_a,
            Side::B => &mut self.reserve_b,
        }
    }

    /// Deposit both tokens and return the minted liquidity
    pub fn add_liquidity(&mut self, amount_a: &BigUint, amount_b: &BigUint) -> Result<BigUint> {
        self.add_liquidity_detailed(amount_a, amount_b)
            .map(|outcome| outcome.liquidity)
    }

    /// Rebalance the deposit, require it to match the pool ratio, mint shares
    ///
    /// The correction splits the ratio mismatch `a*B - b*A` symmetrically
    /// between the two sides (divisions truncate toward zero). Minted
    /// liquidity is `isqrt(amount_a * amount_b)` of the raw amounts.
    pub fn add_liquidity_detailed(
        &mut self,
        amount_a: &BigUint,
        amount_b: &BigUint,
    ) -> Result<DepositOutcome> {
        self.ensure_active()?;
        if amount_a.is_zero() || amount_b.is_zero() {
            return Err(PoolError::ZeroAmount);
        }

        let a = BigInt::from(amount_a.clone());
        let b = BigInt::from(amount_b.clone());
        let reserve_a = BigInt::from(self.reserve_a.clone());
        let reserve_b = BigInt::from(self.reserve_b.clone());
        let two = BigInt::from(2u8);

        let mismatch = &a * &reserve_b - &b * &reserve_a;
        let a_hat = &mismatch / (&two * (&b + &reserve_b));
        let b_hat = &mismatch / (&two * (&a + &reserve_a));
        let a_star = &a - &a_hat;
        let b_star = &b + &b_hat;

        let mut outcome = DepositOutcome {
            adjusted_reserve_a: &reserve_a + &a_hat,
            adjusted_reserve_b: &reserve_b - &b_hat,
            liquidity: isqrt(&(amount_a * amount_b)),
            a_hat,
            b_hat,
            a_star,
            b_star,
            committed: false,
        };
        if let Some(observer) = &self.observer {
            observer.on_deposit_rebalance(&outcome);
        }

        let a_star = non_negative(&outcome.a_star, "rebalanced amount A")?;
        let b_star = non_negative(&outcome.b_star, "rebalanced amount B")?;
        let (candidate, expected) = self.ratio_pair(&a_star, &b_star)?;
        if candidate != expected {
            debug!(%candidate, %expected, "Deposit rejected as asymmetric");
            return Err(PoolError::AsymmetricDeposit {
                candidate,
                expected,
            });
        }

        if self.deposit_policy == DepositPolicy::Commit {
            let new_a = positive_reserve(&outcome.adjusted_reserve_a, Side::A)?;
            let new_b = positive_reserve(&outcome.adjusted_reserve_b, Side::B)?;
            self.reserve_a = new_a;
            self.reserve_b = new_b;
            outcome.committed = true;
        }

        debug!(
            liquidity = %outcome.liquidity,
            committed = outcome.committed,
            "Liquidity added"
        );
        Ok(outcome)
    }

    /// Largest sub-deposit of `(a, b)` that matches the pool ratio
    ///
    /// The over-supplied side is cut down with floor division; the other side
    /// is used in full. Nothing is mutated.
    pub fn rake_deposit(&self, a: &BigUint, b: &BigUint) -> Result<(BigUint, BigUint)> {
        if a.is_zero() || b.is_zero() {
            return Err(PoolError::ZeroAmount);
        }
        let lhs = a * &self.reserve_b;
        let rhs = b * &self.reserve_a;
        let raked = match lhs.cmp(&rhs) {
            std::cmp::Ordering::Greater => (rhs / &self.reserve_b, b.clone()),
            std::cmp::Ordering::Less => (a.clone(), lhs / &self.reserve_a),
            std::cmp::Ordering::Equal => (a.clone(), b.clone()),
        };
        Ok(raked)
    }

    /// Split `amount` of `side` so that swapping one part yields a pair
    /// matching the post-swap reserves
    ///
    /// Starts by selling half and halves the step while the mismatch between
    /// the kept part and `out * new_bid / new_ask` keeps shrinking. The fee is
    /// counted in the ask reserve, as a real swap would leave it. Read-only.
    pub fn quote_sided_deposit(&self, amount: &BigUint, side: Side) -> Result<SidedDepositQuote> {
        self.ensure_active()?;
        if amount.is_zero() {
            return Err(PoolError::ZeroAmount);
        }
        let ask = side.opposite();

        let mut step = amount.clone();
        let mut swap_in: BigUint = amount / 2u32;
        let mut rounds = 0u32;
        let swap = loop {
            rounds += 1;
            let leg = self.quote_leg(&swap_in, side, ask)?;
            let retained = amount - &swap_in;
            let target = &leg.amount_out * &leg.new_bid_reserve / &leg.new_ask_reserve;
            let short = retained > target;
            let next_step = if short {
                (&retained - &target) / 2u32
            } else {
                (&target - &retained) / 2u32
            };
            if next_step >= step {
                break leg;
            }
            step = next_step;
            // the sold part stays within 0..=amount
            swap_in = if short {
                (&swap_in + &step).min(amount.clone())
            } else if step < swap_in {
                &swap_in - &step
            } else {
                BigUint::zero()
            };
        };

        debug!(%amount, %side, %swap_in, rounds, "Sided deposit quoted");
        Ok(SidedDepositQuote {
            side,
            retained: amount - &swap_in,
            swap_in,
            swap,
        })
    }

    /// `quote_swap`, except that an empty leg prices as no trade
    fn quote_leg(&self, amount_in: &BigUint, bid: Side, ask: Side) -> Result<SwapOutcome> {
        if amount_in.is_zero() {
            return Ok(SwapOutcome {
                amount_out: BigUint::zero(),
                fee: BigUint::zero(),
                tax: BigUint::zero(),
                new_bid_reserve: self.reserve(bid).clone(),
                new_ask_reserve: self.reserve(ask).clone(),
            });
        }
        self.quote_swap(amount_in, bid, ask)
    }

    fn ensure_active(&self) -> Result<()> {
        if self.is_frozen() {
            return Err(PoolError::Frozen);
        }
        Ok(())
    }
}

fn non_negative(value: &BigInt, what: &str) -> Result<BigUint> {
    value
        .to_biguint()
        .ok_or_else(|| PoolError::InvalidArgument(format!("{} is negative: {}", what, value)))
}

fn positive_reserve(value: &BigInt, side: Side) -> Result<BigUint> {
    match value.to_biguint() {
        Some(reserve) if !reserve.is_zero() => Ok(reserve),
        _ => Err(PoolError::ReserveDepleted(side)),
    }
}

//! Pool simulator - runs one pool operation from the command line
//!
//! Usage:
//!   amm-sim --reserve-a 1000000000 --reserve-b 5000000000 swap 1000000 --bid B --ask A
//!   amm-sim add-liquidity 1000 5000
//!   amm-sim sided 1000000 --side B
//!   amm-sim --config config/amm.toml snapshot

use amm_pool::{isqrt, AmmSettings, BigUint, LiquidityPool, Side};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "amm-sim")]
#[command(about = "Constant-product AMM pool simulator")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Initial reserve of token A
    #[arg(long, default_value = "1000000000")]
    reserve_a: BigUint,

    /// Initial reserve of token B
    #[arg(long, default_value = "5000000000")]
    reserve_b: BigUint,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sell AMOUNT of the bid token for the ask token
    Swap {
        amount: BigUint,
        #[arg(long, default_value = "A")]
        bid: Side,
        #[arg(long, default_value = "B")]
        ask: Side,
        /// Reject the swap if fewer ask tokens would be delivered
        #[arg(long)]
        min_out: Option<BigUint>,
    },
    /// Deposit both tokens and print the minted liquidity
    AddLiquidity { amount_a: BigUint, amount_b: BigUint },
    /// Compare a deposit ratio with the pool ratio
    CheckRatio { amount_a: BigUint, amount_b: BigUint },
    /// Quote the proportional part of a deposit
    Rake { amount_a: BigUint, amount_b: BigUint },
    /// Quote how a deposit paid in one token splits into swap and deposit
    Sided {
        amount: BigUint,
        #[arg(long, default_value = "A")]
        side: Side,
    },
    /// Print the pool state as JSON
    Snapshot,
    /// Print the integer square root of VALUE
    Isqrt { value: BigUint },
    /// Print the effective configuration as TOML
    ShowConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = AmmSettings::load(args.config.as_deref())?;
    if let Some(level) = &args.log_level {
        settings.log_level = level.clone();
        settings.validate()?;
    }
    init_logging(&settings.log_level);
    match &args.config {
        Some(path) => info!("Loaded AMM config: {:?}", path),
        None => info!("No config file, using defaults and environment"),
    }
    debug!(?settings, "Effective settings");

    if let Err(e) = run(args, &settings) {
        error!("Pool operation failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(args: Args, settings: &AmmSettings) -> Result<()> {
    let mut pool = LiquidityPool::with_config(args.reserve_a, args.reserve_b, &settings.pool)
        .context("Failed to create pool")?;
    info!(
        reserve_a = %pool.reserve(Side::A),
        reserve_b = %pool.reserve(Side::B),
        curve = %pool.curve(),
        "Pool ready"
    );

    match args.command {
        Command::Swap {
            amount,
            bid,
            ask,
            min_out,
        } => {
            let outcome = match min_out {
                Some(limit) => pool.swap_with_limit(&amount, bid, ask, &limit)?,
                None => pool.swap_detailed(&amount, bid, ask)?,
            };
            info!(fee = %outcome.fee, tax = %outcome.tax, "Swap complete");
            println!("{}", outcome.amount_out);
        }
        Command::AddLiquidity { amount_a, amount_b } => {
            let outcome = pool.add_liquidity_detailed(&amount_a, &amount_b)?;
            info!(
                a_star = %outcome.a_star,
                b_star = %outcome.b_star,
                committed = outcome.committed,
                "Liquidity added"
            );
            println!("{}", outcome.liquidity);
        }
        Command::CheckRatio { amount_a, amount_b } => {
            println!("{}", pool.check_liquidity_ratio(&amount_a, &amount_b)?);
        }
        Command::Rake { amount_a, amount_b } => {
            let (a, b) = pool.rake_deposit(&amount_a, &amount_b)?;
            println!("{} {}", a, b);
        }
        Command::Sided { amount, side } => {
            let quote = pool.quote_sided_deposit(&amount, side)?;
            let (a, b) = quote.deposit_pair();
            info!(swap_in = %quote.swap_in, fee = %quote.swap.fee, "Sided deposit quoted");
            println!("{} {}", a, b);
        }
        Command::Snapshot => {
            let snapshot = serde_json::to_string_pretty(&pool.snapshot())
                .context("Failed to serialize snapshot")?;
            println!("{}", snapshot);
        }
        Command::Isqrt { value } => {
            println!("{}", isqrt(&value));
        }
        Command::ShowConfig => {
            print!("{}", settings.to_toml_string()?);
        }
    }

    info!(
        reserve_a = %pool.reserve(Side::A),
        reserve_b = %pool.reserve(Side::B),
        "Final reserves"
    );
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sided_command() {
        let args = Args::try_parse_from([
            "amm-sim",
            "--config",
            "amm.toml",
            "sided",
            "1000000",
            "--side",
            "b",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("amm.toml")));
        match args.command {
            Command::Sided { amount, side } => {
                assert_eq!(amount, BigUint::from(1_000_000u32));
                assert_eq!(side, Side::B);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_sided_command_runs_without_config() {
        let args = Args::try_parse_from(["amm-sim", "sided", "1000000", "--side", "B"]).unwrap();
        assert!(run(args, &AmmSettings::default()).is_ok());
    }
}

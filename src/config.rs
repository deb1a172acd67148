//! Configuration loader and application settings.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use ethers::types::Address;

use crate::errors::{BotError, Result};

// Production deployment defaults (Monad mainnet).
const DEFAULT_ROUTER: &str = "0x4b2ab38dbf28d31d467aa8993f6c2585981d6804";
const DEFAULT_TOKEN: &str = "0x754704bc059f8c67012fed69bc8a327a5aafb603";
const DEFAULT_WRAPPED_NATIVE: &str = "0x3bd359C1119dA7Da1D913D1C4D2B7c461115433A";

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// RPC endpoint for the chain node.
    pub rpc_url: String,
    /// Hex-encoded signing key for the operator wallet.
    pub private_key: String,
    /// V2-style router the swaps go through.
    pub router: Address,
    /// Traded token (the non-native side of the pair).
    pub token: Address,
    /// Wrapped native coin, the entry hop of every swap path.
    pub wrapped_native: Address,
    /// Time between cycle triggers.
    pub poll_interval: Duration,
    /// Optional NDJSON trade journal path.
    pub journal_path: Option<String>,
    pub strategy: StrategyConfig,
}

/// Knobs for the decision rule and the swap protocol.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// Native units kept aside for gas, never traded.
    pub gas_reserve: f64,
    /// Smallest native amount worth selling.
    pub min_trade_native: f64,
    /// Smallest token amount worth spending on a buy.
    pub min_trade_token: f64,
    /// Minimum estimated profit (token units) required to sell.
    pub min_profit: f64,
    /// Slippage tolerance in basis points.
    pub slippage_bps: u32,
    /// Seconds a submitted swap stays valid on-chain.
    pub deadline_secs: u64,
    pub short_ma_period: usize,
    pub long_ma_period: usize,
    /// Pause after any swap attempt before deciding again.
    pub cooldown: Duration,
    /// Gate sells to uptrends and buys to dips using the short average.
    pub trend_gated: bool,
}

impl BotConfig {
    /// Load configuration from environment variables, falling back to the
    /// production defaults for everything except the endpoint and key.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            rpc_url: env_required("MONAD_RPC_URL")?,
            private_key: env_required("PRIVATE_KEY")?,
            router: env_address("ROUTER_ADDRESS", DEFAULT_ROUTER)?,
            token: env_address("TOKEN_ADDRESS", DEFAULT_TOKEN)?,
            wrapped_native: env_address("WRAPPED_NATIVE_ADDRESS", DEFAULT_WRAPPED_NATIVE)?,
            poll_interval: Duration::from_secs(env_parse("POLL_INTERVAL_SECS", 5u64)?),
            journal_path: std::env::var("TRADE_JOURNAL_PATH").ok(),
            strategy: StrategyConfig {
                gas_reserve: env_parse("GAS_RESERVE", 0.5)?,
                min_trade_native: env_parse("MIN_TRADE_NATIVE", 1.0)?,
                min_trade_token: env_parse("MIN_TRADE_TOKEN", 0.01)?,
                min_profit: env_parse("MIN_PROFIT", 0.02)?,
                slippage_bps: env_parse("SLIPPAGE_BPS", 200u32)?,
                deadline_secs: env_parse("DEADLINE_SECS", 600u64)?,
                short_ma_period: env_parse("SHORT_MA_PERIOD", 5usize)?,
                long_ma_period: env_parse("LONG_MA_PERIOD", 15usize)?,
                cooldown: Duration::from_secs(env_parse("COOLDOWN_SECS", 15u64)?),
                trend_gated: env_parse("TREND_GATED", true)?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let s = &self.strategy;
        if s.slippage_bps >= 10_000 {
            return Err(BotError::ConfigurationInvalid(
                "SLIPPAGE_BPS must be below 10000".into(),
            ));
        }
        if s.short_ma_period == 0 || s.long_ma_period == 0 {
            return Err(BotError::ConfigurationInvalid(
                "moving-average periods must be at least 1".into(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(BotError::ConfigurationInvalid(
                "POLL_INTERVAL_SECS must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("GAS_RESERVE", s.gas_reserve),
            ("MIN_TRADE_NATIVE", s.min_trade_native),
            ("MIN_TRADE_TOKEN", s.min_trade_token),
            ("MIN_PROFIT", s.min_profit),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BotError::ConfigurationInvalid(format!(
                    "{name} must be a finite non-negative number"
                )));
            }
        }
        Ok(())
    }
}

fn env_required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| BotError::ConfigurationInvalid(format!("{key} must be set")))
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| BotError::ConfigurationInvalid(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn env_address(key: &str, default: &str) -> Result<Address> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.into());
    raw.trim()
        .parse()
        .map_err(|e| BotError::ConfigurationInvalid(format!("{key}: {e}")))
}

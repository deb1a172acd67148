//! Shared data structures used throughout the application.

use std::fmt;
use std::time::SystemTime;

use ethers::types::{Address, TxHash, U256};
use serde::Serialize;
use tokio::time::Instant;

/// Raw wallet balances in smallest units, read fresh each cycle.
#[derive(Debug, Clone, Copy)]
pub struct Balances {
    pub native: U256,
    pub token: U256,
}

/// One observed exchange rate (token per one native unit, human units).
#[derive(Debug, Clone, Copy)]
pub struct PriceSample {
    pub rate: f64,
    pub observed_at: SystemTime,
}

/// Advisory context carried between cycles.
///
/// `last_buy_price` feeds the profit estimate only; position size always
/// comes from live balance reads. It is set on a successful buy and left
/// untouched by sells.
#[derive(Debug, Clone, Copy, Default)]
pub struct TradeMemory {
    pub last_buy_price: Option<f64>,
    pub last_trade_at: Option<Instant>,
}

/// On-chain metadata for the traded token, fetched once at startup.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

/// Direction of a swap through the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    /// Spend the native coin, receive the token (sell side).
    NativeToToken,
    /// Spend the token, receive the native coin (buy side).
    TokenToNative,
}

/// Parameters for one swap execution. Built fresh per call, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct SwapRequest {
    pub direction: SwapDirection,
    /// Input amount in the spending asset's smallest units.
    pub input_amount: U256,
    /// Slippage tolerance in basis points.
    pub slippage_bps: u32,
    /// Seconds from now until the router must reject the swap.
    pub deadline_secs: u64,
}

/// Outcome of a confirmed swap.
#[derive(Debug, Clone)]
pub struct SwapReceipt {
    pub direction: SwapDirection,
    pub amount_in: U256,
    /// Router-quoted output at submission time.
    pub expected_out: U256,
    /// On-chain-enforced worst-case output after slippage tolerance.
    pub min_out: U256,
    /// Realized output measured as the receiving asset's balance delta.
    /// For the native-receiving direction this is net of gas paid.
    pub amount_out: U256,
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// What the engine chose to do in one cycle. Amounts are human units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradeAction {
    Sell { amount_native: f64, est_profit: f64 },
    Buy { amount_token: f64 },
    Hold(HoldReason),
}

/// Why a cycle ended without a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    CoolingDown,
    BelowMinimums,
    ProfitBelowThreshold,
    AwaitingUptrend,
    AwaitingDip,
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            HoldReason::CoolingDown => "cooldown active",
            HoldReason::BelowMinimums => "no balance above trade minimum",
            HoldReason::ProfitBelowThreshold => "estimated profit below threshold",
            HoldReason::AwaitingUptrend => "rate not above short moving average",
            HoldReason::AwaitingDip => "rate not below short moving average",
        };
        write!(f, "{reason}")
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Sell {
                amount_native,
                est_profit,
            } => write!(f, "sell {amount_native:.4} (est profit {est_profit:.6})"),
            TradeAction::Buy { amount_token } => write!(f, "buy with {amount_token:.6}"),
            TradeAction::Hold(reason) => write!(f, "hold ({reason})"),
        }
    }
}

/// Summary of one engine cycle, for reporting and tests.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub action: TradeAction,
    /// Token per native rate observed this cycle.
    pub rate: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    /// Balances in human units at the start of the cycle.
    pub balance_native: f64,
    pub balance_token: f64,
    pub receipt: Option<SwapReceipt>,
}

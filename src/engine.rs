//! Trade decision engine: the per-cycle fetch, decide, act state machine.

use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

use crate::chain::{self, ChainClient, units};
use crate::config::StrategyConfig;
use crate::errors::Result;
use crate::executor::SwapExecutor;
use crate::journal::{TradeJournal, TradeRecord};
use crate::models::{
    Balances, CycleReport, HoldReason, PriceSample, SwapDirection, SwapReceipt, SwapRequest,
    TokenInfo, TradeAction, TradeMemory,
};
use crate::quote::QuoteService;
use crate::trend::TrendTracker;

/// Inputs the decision rule evaluates, all in human units.
#[derive(Debug, Clone, Copy)]
struct DecisionInputs {
    balance_native: f64,
    balance_token: f64,
    rate: f64,
    short_ma: f64,
    last_buy_price: Option<f64>,
}

/// State carried between cycles. Touched only by the permit-holding cycle;
/// the lock is never held across an await of chain I/O.
#[derive(Debug, Default)]
struct EngineState {
    memory: TradeMemory,
    trend: TrendTracker,
}

/// Runs one fetch-decide-act cycle at a time over live chain state.
pub struct TradeEngine<C> {
    chain: Arc<C>,
    quotes: QuoteService<C>,
    executor: SwapExecutor<C>,
    strategy: StrategyConfig,
    token: TokenInfo,
    state: Mutex<EngineState>,
    journal: Option<TradeJournal>,
}

impl<C: ChainClient> TradeEngine<C> {
    pub fn new(
        chain: Arc<C>,
        quotes: QuoteService<C>,
        executor: SwapExecutor<C>,
        strategy: StrategyConfig,
        token: TokenInfo,
        journal: Option<TradeJournal>,
    ) -> Self {
        Self {
            chain,
            quotes,
            executor,
            strategy,
            token,
            state: Mutex::new(EngineState::default()),
            journal,
        }
    }

    /// Snapshot of the advisory memory, for inspection.
    pub async fn memory(&self) -> TradeMemory {
        self.state.lock().await.memory
    }

    /// One full cycle: fetch balances and rate, record the sample, decide,
    /// act, update memory.
    ///
    /// A fetch failure ends the cycle without arming the cooldown. Any swap
    /// attempt, confirmed or failed, arms it.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let (native_raw, token_raw) = futures::try_join!(
            self.chain.native_balance(),
            self.chain.token_balance(self.token.address)
        )?;
        let balances = Balances {
            native: native_raw,
            token: token_raw,
        };
        let rate = self
            .quotes
            .unit_rate(SwapDirection::NativeToToken, 1.0)
            .await?;

        let balance_native = units::to_f64_units(balances.native, chain::NATIVE_DECIMALS);
        let balance_token = units::to_f64_units(balances.token, self.token.decimals);

        let (short_ma, long_ma, memory) = {
            let mut state = self.state.lock().await;
            state.trend.record(PriceSample {
                rate,
                observed_at: SystemTime::now(),
            });
            let short = state
                .trend
                .moving_average(self.strategy.short_ma_period)
                .unwrap_or(rate);
            let long = state
                .trend
                .moving_average(self.strategy.long_ma_period)
                .unwrap_or(rate);
            (short, long, state.memory)
        };

        // Cooldown suppresses the decision step entirely; the sample above
        // still extends the trend history.
        let cooling = memory
            .last_trade_at
            .is_some_and(|at| at.elapsed() < self.strategy.cooldown);
        let action = if cooling {
            TradeAction::Hold(HoldReason::CoolingDown)
        } else {
            decide(
                &self.strategy,
                &DecisionInputs {
                    balance_native,
                    balance_token,
                    rate,
                    short_ma,
                    last_buy_price: memory.last_buy_price,
                },
            )
        };

        info!(
            native = balance_native,
            token = balance_token,
            rate,
            short_ma,
            long_ma,
            action = %action,
            "[CYCLE] status"
        );

        let request = match action {
            TradeAction::Sell { amount_native, .. } => Some(SwapRequest {
                direction: SwapDirection::NativeToToken,
                input_amount: units::from_f64_units(amount_native, chain::NATIVE_DECIMALS),
                slippage_bps: self.strategy.slippage_bps,
                deadline_secs: self.strategy.deadline_secs,
            }),
            TradeAction::Buy { amount_token } => Some(SwapRequest {
                direction: SwapDirection::TokenToNative,
                input_amount: units::from_f64_units(amount_token, self.token.decimals),
                slippage_bps: self.strategy.slippage_bps,
                deadline_secs: self.strategy.deadline_secs,
            }),
            TradeAction::Hold(_) => None,
        };

        let mut receipt = None;
        if let Some(request) = request {
            let result = self.executor.execute(&request).await;
            // Any attempt arms the cooldown; only a confirmed buy moves the
            // remembered buy price.
            {
                let mut state = self.state.lock().await;
                state.memory.last_trade_at = Some(Instant::now());
                if result.is_ok() && request.direction == SwapDirection::TokenToNative {
                    state.memory.last_buy_price = Some(rate);
                }
            }
            let confirmed = result?;
            self.report_trade(&action, &confirmed, rate).await;
            receipt = Some(confirmed);
        }

        Ok(CycleReport {
            action,
            rate,
            short_ma,
            long_ma,
            balance_native,
            balance_token,
            receipt,
        })
    }

    /// Log an executed trade and journal it when a journal is configured.
    async fn report_trade(&self, action: &TradeAction, receipt: &SwapReceipt, rate: f64) {
        let (amount_in, amount_out) = match receipt.direction {
            SwapDirection::NativeToToken => (
                units::to_f64_units(receipt.amount_in, chain::NATIVE_DECIMALS),
                units::to_f64_units(receipt.amount_out, self.token.decimals),
            ),
            SwapDirection::TokenToNative => (
                units::to_f64_units(receipt.amount_in, self.token.decimals),
                units::to_f64_units(receipt.amount_out, chain::NATIVE_DECIMALS),
            ),
        };
        let est_profit = match action {
            TradeAction::Sell { est_profit, .. } => Some(*est_profit),
            _ => None,
        };
        info!(
            amount_in,
            amount_out,
            rate,
            tx = ?receipt.tx_hash,
            block = receipt.block_number,
            "[TRADE] executed"
        );
        if let Some(journal) = &self.journal {
            journal
                .append(&TradeRecord::new(
                    receipt.direction,
                    amount_in,
                    amount_out,
                    rate,
                    est_profit,
                    receipt.tx_hash,
                    receipt.block_number,
                ))
                .await;
        }
    }
}

/// The decision rule over human-unit values. The sell branch is evaluated
/// first; a sell-eligible cycle never falls through to the buy branch.
fn decide(strategy: &StrategyConfig, inputs: &DecisionInputs) -> TradeAction {
    let tradable = inputs.balance_native - strategy.gas_reserve;
    if tradable > strategy.min_trade_native {
        // Unset buy price counts full proceeds as profit.
        let cost_basis = inputs.last_buy_price.unwrap_or(0.0);
        let est_profit = tradable * inputs.rate - tradable * cost_basis;
        if est_profit < strategy.min_profit {
            return TradeAction::Hold(HoldReason::ProfitBelowThreshold);
        }
        if strategy.trend_gated && inputs.rate <= inputs.short_ma {
            return TradeAction::Hold(HoldReason::AwaitingUptrend);
        }
        return TradeAction::Sell {
            amount_native: tradable,
            est_profit,
        };
    }
    if inputs.balance_token > strategy.min_trade_token {
        if strategy.trend_gated && inputs.rate >= inputs.short_ma {
            return TradeAction::Hold(HoldReason::AwaitingDip);
        }
        return TradeAction::Buy {
            amount_token: inputs.balance_token,
        };
    }
    TradeAction::Hold(HoldReason::BelowMinimums)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn strategy() -> StrategyConfig {
        StrategyConfig {
            gas_reserve: 1.0,
            min_trade_native: 1.0,
            min_trade_token: 0.01,
            min_profit: 0.02,
            slippage_bps: 200,
            deadline_secs: 600,
            short_ma_period: 5,
            long_ma_period: 15,
            cooldown: Duration::from_secs(15),
            trend_gated: true,
        }
    }

    fn inputs() -> DecisionInputs {
        DecisionInputs {
            balance_native: 10.0,
            balance_token: 0.0,
            rate: 2.0,
            short_ma: 1.5,
            last_buy_price: None,
        }
    }

    #[test]
    fn sells_on_profit_and_uptrend() {
        match decide(&strategy(), &inputs()) {
            TradeAction::Sell {
                amount_native,
                est_profit,
            } => {
                assert_eq!(amount_native, 9.0);
                // Unset buy price: full proceeds count as profit.
                assert_eq!(est_profit, 18.0);
            }
            other => panic!("expected sell, got {other:?}"),
        }
    }

    #[test]
    fn profit_subtracts_remembered_cost_basis() {
        let mut i = inputs();
        i.last_buy_price = Some(1.5);
        match decide(&strategy(), &i) {
            TradeAction::Sell { est_profit, .. } => {
                assert!((est_profit - 4.5).abs() < 1e-9);
            }
            other => panic!("expected sell, got {other:?}"),
        }
    }

    #[test]
    fn holds_when_profit_below_threshold() {
        let mut i = inputs();
        i.last_buy_price = Some(2.0);
        assert_eq!(
            decide(&strategy(), &i),
            TradeAction::Hold(HoldReason::ProfitBelowThreshold)
        );
    }

    #[test]
    fn rate_equal_to_short_ma_is_not_an_uptrend() {
        let mut i = inputs();
        i.short_ma = 2.0;
        assert_eq!(
            decide(&strategy(), &i),
            TradeAction::Hold(HoldReason::AwaitingUptrend)
        );
    }

    #[test]
    fn sell_branch_never_falls_through_to_buy() {
        let mut i = inputs();
        i.balance_token = 50.0;
        i.last_buy_price = Some(2.0);
        // Sell-eligible with a failed profit gate holds; it must not buy.
        assert_eq!(
            decide(&strategy(), &i),
            TradeAction::Hold(HoldReason::ProfitBelowThreshold)
        );
    }

    #[test]
    fn buys_full_token_balance_on_dip() {
        let i = DecisionInputs {
            balance_native: 0.5,
            balance_token: 18.0,
            rate: 1.0,
            short_ma: 1.5,
            last_buy_price: None,
        };
        assert_eq!(
            decide(&strategy(), &i),
            TradeAction::Buy { amount_token: 18.0 }
        );
    }

    #[test]
    fn holds_awaiting_dip_when_rate_at_or_above_ma() {
        let i = DecisionInputs {
            balance_native: 0.5,
            balance_token: 18.0,
            rate: 1.5,
            short_ma: 1.5,
            last_buy_price: None,
        };
        assert_eq!(
            decide(&strategy(), &i),
            TradeAction::Hold(HoldReason::AwaitingDip)
        );
    }

    #[test]
    fn holds_when_no_balance_clears_minimum() {
        let i = DecisionInputs {
            balance_native: 1.5,
            balance_token: 0.005,
            rate: 2.0,
            short_ma: 1.0,
            last_buy_price: None,
        };
        assert_eq!(
            decide(&strategy(), &i),
            TradeAction::Hold(HoldReason::BelowMinimums)
        );
    }

    #[test]
    fn profit_only_variant_ignores_the_trend_gate() {
        let mut s = strategy();
        s.trend_gated = false;

        let mut sell_inputs = inputs();
        sell_inputs.short_ma = 5.0;
        assert!(matches!(
            decide(&s, &sell_inputs),
            TradeAction::Sell { .. }
        ));

        let buy_inputs = DecisionInputs {
            balance_native: 0.5,
            balance_token: 18.0,
            rate: 2.0,
            short_ma: 1.0,
            last_buy_price: None,
        };
        assert_eq!(
            decide(&s, &buy_inputs),
            TradeAction::Buy { amount_token: 18.0 }
        );
    }
}

//! Swap execution protocol: precondition, quote, slippage floor, approval,
//! submission, confirmation, realized-output accounting.

use std::sync::Arc;

use ethers::types::U256;
use tracing::info;

use crate::chain::{self, ChainClient};
use crate::errors::{BotError, Result};
use crate::models::{SwapDirection, SwapReceipt, SwapRequest, TokenInfo};
use crate::quote::QuoteService;
use crate::utils;

/// Executes one swap end to end. Never retries; every failure is surfaced
/// to the caller.
pub struct SwapExecutor<C> {
    chain: Arc<C>,
    quotes: QuoteService<C>,
    token: TokenInfo,
}

impl<C: ChainClient> SwapExecutor<C> {
    pub fn new(chain: Arc<C>, quotes: QuoteService<C>, token: TokenInfo) -> Self {
        Self {
            chain,
            quotes,
            token,
        }
    }

    /// Run the full protocol for one request.
    ///
    /// Order: balance precondition, expected-output quote, minimum-output
    /// floor, approval for the token-spending direction, submission with a
    /// deadline, confirmation, realized output via the receiving balance
    /// delta.
    pub async fn execute(&self, request: &SwapRequest) -> Result<SwapReceipt> {
        let have = self.spending_balance(request.direction).await?;
        if have < request.input_amount {
            return Err(BotError::InsufficientBalance {
                asset: self.spending_symbol(request.direction).to_string(),
                have,
                need: request.input_amount,
            });
        }

        let expected_out = self
            .quotes
            .expected_out(request.direction, request.input_amount)
            .await?;
        let min_out = min_output(expected_out, request.slippage_bps);

        info!(
            direction = ?request.direction,
            amount_in = %request.input_amount,
            expected_out = %expected_out,
            min_out = %min_out,
            "[SWAP] submitting"
        );

        // Receiving-side balance before submission; realized output is the
        // delta after confirmation.
        let receive_before = self.receiving_balance(request.direction).await?;

        if request.direction == SwapDirection::TokenToNative {
            self.ensure_allowance(request.input_amount).await?;
        }

        let deadline = U256::from(utils::unix_now() + request.deadline_secs);
        let path = self.quotes.path(request.direction);
        let outcome = match request.direction {
            SwapDirection::NativeToToken => {
                self.chain
                    .swap_native_for_token(request.input_amount, min_out, &path, deadline)
                    .await?
            }
            SwapDirection::TokenToNative => {
                self.chain
                    .swap_token_for_native(request.input_amount, min_out, &path, deadline)
                    .await?
            }
        };

        let receive_after = self.receiving_balance(request.direction).await?;
        let amount_out = receive_after.saturating_sub(receive_before);

        info!(
            tx = ?outcome.tx_hash,
            block = outcome.block_number,
            amount_out = %amount_out,
            "[SWAP] confirmed"
        );

        Ok(SwapReceipt {
            direction: request.direction,
            amount_in: request.input_amount,
            expected_out,
            min_out,
            amount_out,
            tx_hash: outcome.tx_hash,
            block_number: outcome.block_number,
        })
    }

    async fn spending_balance(&self, direction: SwapDirection) -> Result<U256> {
        match direction {
            SwapDirection::NativeToToken => self.chain.native_balance().await,
            SwapDirection::TokenToNative => self.chain.token_balance(self.token.address).await,
        }
    }

    async fn receiving_balance(&self, direction: SwapDirection) -> Result<U256> {
        match direction {
            SwapDirection::NativeToToken => self.chain.token_balance(self.token.address).await,
            SwapDirection::TokenToNative => self.chain.native_balance().await,
        }
    }

    fn spending_symbol(&self, direction: SwapDirection) -> &str {
        match direction {
            SwapDirection::NativeToToken => chain::NATIVE_SYMBOL,
            SwapDirection::TokenToNative => &self.token.symbol,
        }
    }

    /// Approve the router for exactly `amount`, skipping the transaction
    /// when the standing allowance already covers it.
    async fn ensure_allowance(&self, amount: U256) -> Result<()> {
        let spender = self.chain.router_address();
        let current = self.chain.allowance(self.token.address, spender).await?;
        if current >= amount {
            return Ok(());
        }
        let outcome = self
            .chain
            .approve(self.token.address, spender, amount)
            .await
            .map_err(|e| match e {
                BotError::ChainUnavailable(_) => e,
                other => BotError::ApprovalFailed(other.to_string()),
            })?;
        info!(tx = ?outcome.tx_hash, "[SWAP] approval confirmed");
        Ok(())
    }
}

/// Worst-case output floor for `expected` after a slippage tolerance in
/// basis points. Integer floor arithmetic, matching the on-chain check.
pub fn min_output(expected: U256, slippage_bps: u32) -> U256 {
    let keep = U256::from(10_000u64.saturating_sub(u64::from(slippage_bps)));
    expected.saturating_mul(keep) / U256::from(10_000u64)
}

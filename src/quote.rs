//! Directional router quotes and unit-rate derivation.

use std::sync::Arc;

use ethers::types::{Address, U256};

use crate::chain::{self, ChainClient, units};
use crate::errors::{BotError, Result};
use crate::models::SwapDirection;

/// Reads the router's output-for-input quotes for the configured pair.
///
/// Never caches: pool reserves move every block, so each call issues a fresh
/// read.
pub struct QuoteService<C> {
    chain: Arc<C>,
    wrapped_native: Address,
    token: Address,
    token_decimals: u8,
}

impl<C> Clone for QuoteService<C> {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            wrapped_native: self.wrapped_native,
            token: self.token,
            token_decimals: self.token_decimals,
        }
    }
}

impl<C> QuoteService<C> {
    pub fn new(chain: Arc<C>, wrapped_native: Address, token: Address, token_decimals: u8) -> Self {
        Self {
            chain,
            wrapped_native,
            token,
            token_decimals,
        }
    }

    /// Swap path for a direction. The native side enters the pair through
    /// the wrapped native coin.
    pub fn path(&self, direction: SwapDirection) -> [Address; 2] {
        match direction {
            SwapDirection::NativeToToken => [self.wrapped_native, self.token],
            SwapDirection::TokenToNative => [self.token, self.wrapped_native],
        }
    }
}

impl<C: ChainClient> QuoteService<C> {
    /// Final-hop output the router currently quotes for `amount_in`.
    pub async fn expected_out(&self, direction: SwapDirection, amount_in: U256) -> Result<U256> {
        let path = self.path(direction);
        let amounts = self.chain.amounts_out(amount_in, &path).await?;
        amounts
            .last()
            .copied()
            .ok_or_else(|| BotError::ChainUnavailable("router returned an empty quote".into()))
    }

    /// Implied human-unit rate (output per one unit of input) for a notional
    /// input amount.
    pub async fn unit_rate(&self, direction: SwapDirection, notional: f64) -> Result<f64> {
        if !notional.is_finite() || notional <= 0.0 {
            return Err(BotError::ConfigurationInvalid(format!(
                "quote notional must be positive, got {notional}"
            )));
        }
        let (in_decimals, out_decimals) = match direction {
            SwapDirection::NativeToToken => (chain::NATIVE_DECIMALS, self.token_decimals),
            SwapDirection::TokenToNative => (self.token_decimals, chain::NATIVE_DECIMALS),
        };
        let amount_in = units::from_f64_units(notional, in_decimals);
        let out = self.expected_out(direction, amount_in).await?;
        Ok(units::to_f64_units(out, out_decimals) / notional)
    }
}

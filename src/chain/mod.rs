//! Chain access boundary: balance reads, router quotes, and transaction
//! submission behind one async trait.

mod client;
pub mod units;

pub use client::EthersChain;

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};

use crate::errors::Result;

/// Decimals of the chain's native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// Display symbol of the chain's native coin.
pub const NATIVE_SYMBOL: &str = "MON";

/// Reference to a transaction that made it on-chain.
#[derive(Debug, Clone, Copy)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub block_number: u64,
}

/// Reads and transacts against the chain on behalf of the operator wallet.
///
/// Submission methods wait for inclusion and surface on-chain reverts as
/// errors, so a returned [`TxOutcome`] always refers to a successful
/// transaction. No method enforces a wall-clock timeout; a hung RPC call
/// stalls the caller.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn wallet_address(&self) -> Address;

    /// Router the swap submissions go through (the approval spender).
    fn router_address(&self) -> Address;

    async fn native_balance(&self) -> Result<U256>;

    async fn token_balance(&self, token: Address) -> Result<U256>;

    async fn token_decimals(&self, token: Address) -> Result<u8>;

    async fn token_symbol(&self, token: Address) -> Result<String>;

    /// Router quote along `path`; the last element is the final-hop output.
    async fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>>;

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256>;

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxOutcome>;

    /// Swap `amount_in` of the native coin for at least `min_out` tokens.
    async fn swap_native_for_token(
        &self,
        amount_in: U256,
        min_out: U256,
        path: &[Address],
        deadline: U256,
    ) -> Result<TxOutcome>;

    /// Swap `amount_in` tokens for at least `min_out` of the native coin.
    async fn swap_token_for_native(
        &self,
        amount_in: U256,
        min_out: U256,
        path: &[Address],
        deadline: U256,
    ) -> Result<TxOutcome>;
}

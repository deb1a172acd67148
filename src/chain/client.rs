use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    contract::{ContractError, abigen},
    middleware::SignerMiddleware,
    providers::{Http, Middleware, PendingTransaction, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, U64, U256},
};

use crate::chain::{ChainClient, TxOutcome};
use crate::errors::{BotError, Result};

abigen!(
    UniswapV2Router,
    r#"[
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts)
        function swapExactETHForTokens(uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external payable returns (uint256[] memory amounts)
        function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts)
    ]"#
);

abigen!(
    Erc20Token,
    r#"[
        function approve(address spender, uint256 amount) external returns (bool)
        function allowance(address owner, address spender) external view returns (uint256)
        function balanceOf(address owner) external view returns (uint256)
        function decimals() external view returns (uint8)
        function symbol() external view returns (string)
    ]"#
);

type ChainMiddleware = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Production chain client: HTTP JSON-RPC provider with a local signing key
/// and a bound V2-style router contract.
pub struct EthersChain {
    client: Arc<ChainMiddleware>,
    router: UniswapV2Router<ChainMiddleware>,
    router_address: Address,
    wallet_address: Address,
}

impl EthersChain {
    /// Connect the provider, bind the signing key to the chain id, and wire
    /// the router contract.
    pub async fn connect(rpc_url: &str, private_key: &str, router_address: Address) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| BotError::ConfigurationInvalid(format!("RPC url: {e}")))?;
        // Doubles as the connectivity sanity check.
        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| BotError::ChainUnavailable(e.to_string()))?;
        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| BotError::ConfigurationInvalid(format!("private key: {e}")))?
            .with_chain_id(chain_id.as_u64());
        let wallet_address = wallet.address();
        let client = Arc::new(SignerMiddleware::new(provider, wallet));
        let router = UniswapV2Router::new(router_address, client.clone());
        Ok(Self {
            client,
            router,
            router_address,
            wallet_address,
        })
    }

    fn erc20(&self, token: Address) -> Erc20Token<ChainMiddleware> {
        Erc20Token::new(token, self.client.clone())
    }
}

#[async_trait]
impl ChainClient for EthersChain {
    fn wallet_address(&self) -> Address {
        self.wallet_address
    }

    fn router_address(&self) -> Address {
        self.router_address
    }

    async fn native_balance(&self) -> Result<U256> {
        self.client
            .get_balance(self.wallet_address, None)
            .await
            .map_err(|e| BotError::ChainUnavailable(e.to_string()))
    }

    async fn token_balance(&self, token: Address) -> Result<U256> {
        self.erc20(token)
            .balance_of(self.wallet_address)
            .call()
            .await
            .map_err(map_contract_err)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        self.erc20(token)
            .decimals()
            .call()
            .await
            .map_err(map_contract_err)
    }

    async fn token_symbol(&self, token: Address) -> Result<String> {
        self.erc20(token)
            .symbol()
            .call()
            .await
            .map_err(map_contract_err)
    }

    async fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        self.router
            .get_amounts_out(amount_in, path.to_vec())
            .call()
            .await
            .map_err(map_contract_err)
    }

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256> {
        self.erc20(token)
            .allowance(self.wallet_address, spender)
            .call()
            .await
            .map_err(map_contract_err)
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<TxOutcome> {
        let call = self.erc20(token).approve(spender, amount);
        let pending = call.send().await.map_err(map_contract_err)?;
        wait_for_receipt(pending).await
    }

    async fn swap_native_for_token(
        &self,
        amount_in: U256,
        min_out: U256,
        path: &[Address],
        deadline: U256,
    ) -> Result<TxOutcome> {
        let call = self
            .router
            .swap_exact_eth_for_tokens(min_out, path.to_vec(), self.wallet_address, deadline)
            .value(amount_in);
        let pending = call.send().await.map_err(map_contract_err)?;
        wait_for_receipt(pending).await
    }

    async fn swap_token_for_native(
        &self,
        amount_in: U256,
        min_out: U256,
        path: &[Address],
        deadline: U256,
    ) -> Result<TxOutcome> {
        let call = self.router.swap_exact_tokens_for_eth(
            amount_in,
            min_out,
            path.to_vec(),
            self.wallet_address,
            deadline,
        );
        let pending = call.send().await.map_err(map_contract_err)?;
        wait_for_receipt(pending).await
    }
}

fn map_contract_err(e: ContractError<ChainMiddleware>) -> BotError {
    if e.is_revert() {
        BotError::TransactionReverted(e.to_string())
    } else {
        BotError::ChainUnavailable(e.to_string())
    }
}

/// Await inclusion and surface a status-0 receipt as a revert.
async fn wait_for_receipt(pending: PendingTransaction<'_, Http>) -> Result<TxOutcome> {
    let tx_hash = pending.tx_hash();
    let receipt = pending
        .await
        .map_err(|e| BotError::ChainUnavailable(e.to_string()))?
        .ok_or_else(|| BotError::ChainUnavailable(format!("no receipt for tx {tx_hash:?}")))?;
    if receipt.status != Some(U64::from(1)) {
        return Err(BotError::TransactionReverted(format!(
            "tx {:?} reverted in block {}",
            receipt.transaction_hash,
            receipt.block_number.unwrap_or_default()
        )));
    }
    Ok(TxOutcome {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number.unwrap_or_default().as_u64(),
    })
}

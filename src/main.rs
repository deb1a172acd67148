use std::sync::Arc;

use anyhow::Result;
use monad_trader::{
    chain::{self, ChainClient, EthersChain},
    config::BotConfig,
    engine::TradeEngine,
    executor::SwapExecutor,
    journal::TradeJournal,
    models::TokenInfo,
    quote::QuoteService,
    scheduler, utils,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = BotConfig::from_env()?;
    let chain = Arc::new(
        EthersChain::connect(&config.rpc_url, &config.private_key, config.router).await?,
    );

    let (symbol, decimals) = futures::try_join!(
        chain.token_symbol(config.token),
        chain.token_decimals(config.token)
    )?;
    let token = TokenInfo {
        address: config.token,
        symbol,
        decimals,
    };

    tracing::info!(
        wallet = ?chain.wallet_address(),
        router = ?config.router,
        "[INIT] monad-trader starting"
    );
    let pair = format!("{}/{}", chain::NATIVE_SYMBOL, token.symbol);
    tracing::info!(
        pair = %pair,
        token_decimals = token.decimals,
        "[INIT] trading pair"
    );
    tracing::info!(
        gas_reserve = config.strategy.gas_reserve,
        min_trade_native = config.strategy.min_trade_native,
        min_trade_token = config.strategy.min_trade_token,
        min_profit = config.strategy.min_profit,
        slippage_bps = config.strategy.slippage_bps,
        deadline_secs = config.strategy.deadline_secs,
        short_ma = config.strategy.short_ma_period,
        long_ma = config.strategy.long_ma_period,
        cooldown_secs = config.strategy.cooldown.as_secs(),
        poll_secs = config.poll_interval.as_secs(),
        trend_gated = config.strategy.trend_gated,
        "[INIT] strategy"
    );

    let quotes = QuoteService::new(
        chain.clone(),
        config.wrapped_native,
        config.token,
        token.decimals,
    );
    let executor = SwapExecutor::new(chain.clone(), quotes.clone(), token.clone());
    let journal = config.journal_path.as_ref().map(TradeJournal::new);
    if let Some(path) = &config.journal_path {
        tracing::info!(path = %path, "[INIT] trade journal enabled");
    }

    let engine = Arc::new(TradeEngine::new(
        chain,
        quotes,
        executor,
        config.strategy.clone(),
        token,
        journal,
    ));

    scheduler::run(engine, config.poll_interval).await;
    Ok(())
}

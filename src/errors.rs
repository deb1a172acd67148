use ethers::types::U256;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BotError>;

/// Failure taxonomy for the trade cycle.
///
/// Everything except `ConfigurationInvalid` is recoverable: the engine logs
/// the failure and the next scheduled cycle re-evaluates fresh state.
#[derive(Debug, Error)]
pub enum BotError {
    /// Spending-side balance below the requested input. Raised before any
    /// chain mutation is attempted.
    #[error("Insufficient {asset} balance: have {have}, need {need}")]
    InsufficientBalance { asset: String, have: U256, need: U256 },

    #[error("Approval failed: {0}")]
    ApprovalFailed(String),

    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    #[error("Chain unavailable: {0}")]
    ChainUnavailable(String),

    /// Missing or unparsable configuration. Fatal at startup, never raised
    /// per cycle.
    #[error("Configuration invalid: {0}")]
    ConfigurationInvalid(String),
}

//! Core library for the monad-trader bot.
//!
//! Module boundaries follow the trade cycle: chain access, quoting, swap
//! execution, trend tracking, the decision engine, and scheduling.

pub mod chain;
pub mod config;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod journal;
pub mod models;
pub mod quote;
pub mod scheduler;
pub mod trend;
pub mod utils;

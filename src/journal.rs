//! Append-only trade journal: one JSON line per executed trade.

use std::path::PathBuf;

use chrono::Utc;
use ethers::types::TxHash;
use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::models::SwapDirection;

/// One journal line. Amounts are human units.
#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    /// RFC 3339 UTC timestamp.
    pub at: String,
    pub direction: SwapDirection,
    pub amount_in: f64,
    pub amount_out: f64,
    /// Token per native rate observed when the trade was decided.
    pub rate: f64,
    /// Estimated profit for sells; null for buys.
    pub est_profit: Option<f64>,
    pub tx_hash: String,
    pub block_number: u64,
}

impl TradeRecord {
    /// Build a record stamped with the current UTC time.
    pub fn new(
        direction: SwapDirection,
        amount_in: f64,
        amount_out: f64,
        rate: f64,
        est_profit: Option<f64>,
        tx_hash: TxHash,
        block_number: u64,
    ) -> Self {
        Self {
            at: Utc::now().to_rfc3339(),
            direction,
            amount_in,
            amount_out,
            rate,
            est_profit,
            tx_hash: format!("{tx_hash:?}"),
            block_number,
        }
    }
}

/// Appends records to an NDJSON file, one line per executed trade.
///
/// The journal is an output log, never read back. Write failures are logged
/// and dropped so they cannot fail a trade cycle.
#[derive(Debug, Clone)]
pub struct TradeJournal {
    path: PathBuf,
}

impl TradeJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn append(&self, record: &TradeRecord) {
        if let Err(e) = self.try_append(record).await {
            warn!(error = %e, path = %self.path.display(), "[TRADE] journal write failed");
        }
    }

    async fn try_append(&self, record: &TradeRecord) -> std::io::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        // write_all only queues the bytes; flush awaits the actual file
        // write and surfaces its error.
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.ndjson");
        let journal = TradeJournal::new(&path);

        let sell = TradeRecord::new(
            SwapDirection::NativeToToken,
            9.0,
            18.0,
            2.0,
            Some(18.0),
            TxHash::zero(),
            7,
        );
        let buy = TradeRecord::new(
            SwapDirection::TokenToNative,
            18.0,
            9.0,
            2.0,
            None,
            TxHash::zero(),
            9,
        );
        journal.append(&sell).await;
        journal.append(&buy).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["direction"], "native_to_token");
        assert_eq!(first["amount_out"], 18.0);
        assert_eq!(first["est_profit"], 18.0);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["est_profit"], serde_json::Value::Null);
        assert_eq!(second["block_number"], 9u64);
    }

    #[tokio::test]
    async fn swallows_write_failures() {
        // A directory cannot be opened for appending; the failed write must
        // end with the warning, not reach the caller.
        let dir = tempfile::tempdir().unwrap();
        let journal = TradeJournal::new(dir.path());

        let record = TradeRecord::new(
            SwapDirection::NativeToToken,
            1.0,
            2.0,
            2.0,
            None,
            TxHash::zero(),
            1,
        );
        journal.append(&record).await;
    }
}

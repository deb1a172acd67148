//! Fixed-interval cycle scheduling with single-flight exclusion.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::chain::ChainClient;
use crate::engine::TradeEngine;

/// Admits at most one cycle at a time. A tick arriving while a cycle holds
/// the permit is dropped, never queued.
#[derive(Clone)]
pub struct SingleFlight {
    permit: Arc<Semaphore>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self {
            permit: Arc::new(Semaphore::new(1)),
        }
    }

    /// The permit if no cycle is in flight; dropping it readmits.
    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        self.permit.clone().try_acquire_owned().ok()
    }
}

impl Default for SingleFlight {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive the engine forever: trigger a cycle attempt every `poll_interval`,
/// skipping missed ticks instead of replaying them in a burst.
///
/// Each admitted cycle runs as its own task so ticks keep being observed
/// (and dropped) while a cycle awaits chain confirmation. A cycle is never
/// aborted mid-flight.
pub async fn run<C>(engine: Arc<TradeEngine<C>>, poll_interval: Duration)
where
    C: ChainClient + 'static,
{
    let guard = SingleFlight::new();
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let Some(permit) = guard.try_acquire() else {
            debug!("[CYCLE] previous cycle still in flight, tick dropped");
            continue;
        };
        let engine = engine.clone();
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = engine.run_cycle().await {
                warn!(error = %e, "[CYCLE] cycle failed");
            }
        });
    }
}

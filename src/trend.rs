//! Bounded price history and moving-average trend signals.

use std::collections::VecDeque;

use crate::models::PriceSample;

/// Number of samples kept for trend analysis.
pub const PRICE_HISTORY_CAPACITY: usize = 20;

/// Ring buffer of recent price samples.
#[derive(Debug, Default)]
pub struct TrendTracker {
    samples: VecDeque<PriceSample>,
}

impl TrendTracker {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(PRICE_HISTORY_CAPACITY),
        }
    }

    /// Append a sample, evicting the oldest once capacity is reached.
    pub fn record(&mut self, sample: PriceSample) {
        if self.samples.len() == PRICE_HISTORY_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Average rate over the most recent `period` samples.
    ///
    /// With fewer samples than `period`, averages whatever is available.
    /// Returns `None` only for an empty history or a zero period.
    pub fn moving_average(&self, period: usize) -> Option<f64> {
        if period == 0 || self.samples.is_empty() {
            return None;
        }
        let window = period.min(self.samples.len());
        let sum: f64 = self
            .samples
            .iter()
            .rev()
            .take(window)
            .map(|s| s.rate)
            .sum();
        Some(sum / window as f64)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

//! Streaming delay statistics
//!
//! One-pass mean/variance accumulation (Welford's update), one instance per
//! tracked quantity. Avoids the cancellation error of a naive
//! sum-of-squares running total.

/// Streaming mean and variance accumulator
#[derive(Debug, Clone, Default)]
pub struct Welford {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Welford {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample into the running statistics
    pub fn insert(&mut self, x: f64) {
        self.count += 1;
        let n = self.count as f64;
        let delta = x - self.mean;
        self.mean += delta / n;
        self.m2 += (n - 1.0) * delta * delta / n;
    }

    /// Number of samples inserted so far
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Running mean (0 before any sample)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance, M2/n (0 before any sample)
    pub fn variance(&self) -> f64 {
        if self.count > 0 {
            self.m2 / self.count as f64
        } else {
            0.0
        }
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> f64 {
        // m2 can dip fractionally below zero from rounding
        self.variance().max(0.0).sqrt()
    }
}

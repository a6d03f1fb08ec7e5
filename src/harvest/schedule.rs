//! Failure streak bookkeeping and next-iteration delay selection

use crate::config::HarvestConfig;
use rand::Rng;
use std::time::Duration;

/// Consecutive failed iterations. Any success resets it to zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FailureStreak {
    count: u32,
}

impl FailureStreak {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one iteration outcome and return the updated count
    pub fn record(&mut self, success: bool) -> u32 {
        if success {
            self.count = 0;
        } else {
            self.count = self.count.saturating_add(1);
        }
        self.count
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn reached(&self, limit: u32) -> bool {
        self.count >= limit
    }
}

/// Base delay per outcome plus a uniform jitter, so cycles are not perfectly periodic.
#[derive(Debug, Clone, PartialEq)]
pub struct DelayPolicy {
    nominal: Duration,
    failure: Duration,
    jitter_min_secs: f64,
    jitter_max_secs: f64,
}

impl DelayPolicy {
    pub fn new(nominal: Duration, failure: Duration, jitter_min_secs: f64, jitter_max_secs: f64) -> Self {
        Self {
            nominal,
            failure,
            jitter_min_secs,
            jitter_max_secs,
        }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::new(
            config.interval(),
            config.fail_interval(),
            config.jitter_min_secs,
            config.jitter_max_secs,
        )
    }

    /// Long nominal delay after a success, short retry delay after a failure
    pub fn base(&self, success: bool) -> Duration {
        if success { self.nominal } else { self.failure }
    }

    pub fn sample_jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.jitter_min_secs >= self.jitter_max_secs {
            return self.jitter_min_secs;
        }
        rng.random_range(self.jitter_min_secs..=self.jitter_max_secs)
    }

    /// `base + jitter`, clamped at zero
    pub fn delay_with(&self, success: bool, jitter_secs: f64) -> Duration {
        let secs = self.base(success).as_secs_f64() + jitter_secs;
        Duration::from_secs_f64(secs.max(0.0))
    }

    pub fn next_delay<R: Rng + ?Sized>(&self, success: bool, rng: &mut R) -> Duration {
        let jitter = self.sample_jitter(rng);
        self.delay_with(success, jitter)
    }
}

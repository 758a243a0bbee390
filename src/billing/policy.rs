//! Payment decision and simulated gateway latency.

use std::time::Duration;

use rand::Rng;

use crate::outcome::PaymentOutcome;

/// Decides payment outcomes against a fixed success probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaymentDecider {
    success_rate: f64,
}

impl PaymentDecider {
    /// `success_rate` is clamped to [0, 1]; NaN counts as 0.
    pub fn new(success_rate: f64) -> Self {
        let success_rate = if success_rate.is_nan() {
            0.0
        } else {
            success_rate.clamp(0.0, 1.0)
        };
        Self { success_rate }
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    /// `draw` is uniform in [0, 1). A zero rate never succeeds, even on a
    /// draw of exactly 0.
    pub fn decide(&self, draw: f64) -> PaymentOutcome {
        if self.success_rate > 0.0 && draw <= self.success_rate {
            PaymentOutcome::Paid
        } else {
            PaymentOutcome::Failed
        }
    }
}

/// How long the simulated gateway takes to answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatencyPolicy {
    None,
    Fixed(Duration),
    /// Uniform in `[min, max)`.
    Uniform { min: Duration, max: Duration },
}

impl Default for LatencyPolicy {
    fn default() -> Self {
        LatencyPolicy::Uniform {
            min: Duration::from_millis(1000),
            max: Duration::from_millis(2000),
        }
    }
}

impl LatencyPolicy {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match *self {
            LatencyPolicy::None => Duration::ZERO,
            LatencyPolicy::Fixed(delay) => delay,
            LatencyPolicy::Uniform { min, max } => {
                let (lo, hi) = (min.as_millis() as u64, max.as_millis() as u64);
                if hi <= lo {
                    min
                } else {
                    Duration::from_millis(rng.gen_range(lo..hi))
                }
            }
        }
    }
}

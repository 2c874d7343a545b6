use std::time::Duration;

use rand::Rng;

/// Exponential backoff parameters.
///
/// The total time budget is not part of the policy; the caller bounds the
/// loop by its own deadline.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry (before jitter).
    pub initial_interval: Duration,
    /// Growth factor applied after every delay.
    pub multiplier: f64,
    /// Jitter: each delay is drawn from `[i * (1 - r), i * (1 + r)]`.
    pub randomization_factor: f64,
    /// Upper bound on the un-jittered interval.
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            multiplier: 1.5,
            randomization_factor: 0.5,
            max_interval: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// A fresh backoff sequence for one append call.
    pub fn start(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            policy: self.clone(),
            current: self.initial_interval,
        }
    }
}

/// The state of one backoff sequence.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    policy: RetryPolicy,
    current: Duration,
}

impl ExponentialBackoff {
    /// The next delay to sleep. Advances the sequence.
    pub fn next_delay(&mut self) -> Duration {
        let delay = jitter(self.current, self.policy.randomization_factor);
        let grown = self.current.as_secs_f64() * self.policy.multiplier.max(1.0);
        self.current = if grown >= self.policy.max_interval.as_secs_f64() {
            self.policy.max_interval
        } else {
            Duration::try_from_secs_f64(grown).unwrap_or(self.policy.max_interval)
        };
        delay
    }
}

fn jitter(interval: Duration, factor: f64) -> Duration {
    let factor = factor.clamp(0.0, 1.0);
    if factor == 0.0 || interval.is_zero() {
        return interval;
    }
    let secs = interval.as_secs_f64();
    let low = secs * (1.0 - factor);
    let high = secs * (1.0 + factor);
    Duration::try_from_secs_f64(rand::thread_rng().gen_range(low..=high)).unwrap_or(Duration::MAX)
}

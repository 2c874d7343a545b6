use std::time::Duration;

use crate::backoff::RetryPolicy;

/// Retry budget used when [`AppendConfig::max_backoff`] is unset.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(10 * 60);

/// Configuration for an [`Appender`](crate::Appender).
///
/// Read once at the start of each append; changing it between calls is fine.
#[derive(Clone, Debug, Default)]
pub struct AppendConfig {
    /// Maximum total time spent retrying contended composes.
    /// `None` means [`DEFAULT_MAX_BACKOFF`].
    pub max_backoff: Option<Duration>,
    /// Gzip the payload before writing; objects get a `.gz` suffix.
    pub gzip: bool,
    /// Interval growth between compose attempts.
    pub retry: RetryPolicy,
}

impl AppendConfig {
    /// The retry budget actually in force.
    pub fn effective_max_backoff(&self) -> Duration {
        match self.max_backoff {
            Some(d) if !d.is_zero() => d,
            _ => DEFAULT_MAX_BACKOFF,
        }
    }

    pub fn with_gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = Some(max_backoff);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-call deadline and cancellation signal for an append.
///
/// The deadline bounds the whole call: it is checked before the retry loop
/// starts, and the loop never runs past it even when the configured retry
/// budget is longer.
#[derive(Clone, Debug, Default)]
pub struct AppendContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl AppendContext {
    /// No deadline, never cancelled unless [`Self::cancel`] is called.
    pub fn background() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now. A timeout too large to represent as an
    /// instant means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::background(),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancel: CancellationToken::new(),
        }
    }

    /// Tie this context to an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` if the deadline has been reached.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Completes once the context is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }
}

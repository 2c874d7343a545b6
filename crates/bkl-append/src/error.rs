use std::time::Duration;

use bkl_store::StoreError;
use bkl_types::{Generation, ObjectRef, TypeError};

/// What a successful append reports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendReceipt {
    /// The object the payload was appended to.
    pub destination: ObjectRef,
    /// Destination generation produced by the winning compose.
    pub generation: Generation,
    /// Destination size after the append.
    pub size: u64,
    pub content_encoding: Option<String>,
    /// Compose attempts, including the successful one.
    pub attempts: u32,
    /// Time spent in the compose loop.
    pub elapsed: Duration,
}

/// Errors from an append call.
#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    /// The destination locator is malformed. Never retried.
    #[error("invalid destination: {0}")]
    Locator(#[from] TypeError),

    /// Gzip encoding of the payload failed.
    #[error("compression failed: {0}")]
    Compression(#[source] std::io::Error),

    /// The payload could not be written to the temporary object.
    #[error("writing temporary object {object} failed: {source}")]
    TemporaryWrite {
        object: ObjectRef,
        #[source]
        source: StoreError,
    },

    /// The store accepted fewer bytes than were written.
    #[error("short write to {object}: wrote {written} of {expected} bytes")]
    ShortWrite {
        object: ObjectRef,
        written: u64,
        expected: u64,
    },

    /// The destination could not be probed or created.
    #[error("preparing destination {object} failed: {source}")]
    Destination {
        object: ObjectRef,
        #[source]
        source: StoreError,
    },

    /// The caller's deadline passed before the append completed.
    #[error("deadline exceeded before the append completed")]
    DeadlineExceeded,

    /// The caller cancelled the append.
    #[error("append cancelled")]
    Cancelled,

    /// A non-contention store failure while reading attributes or composing.
    #[error("composing onto {object} failed: {source}")]
    Compose {
        object: ObjectRef,
        #[source]
        source: StoreError,
    },

    /// Contention persisted for the whole retry budget.
    #[error("gave up after {attempts} contended compose attempts over {elapsed:?}")]
    RetryExhausted { attempts: u32, elapsed: Duration },

    /// The payload was appended, but the temporary object could not be
    /// deleted afterwards.
    #[error("appended to {}, but deleting temporary object {temporary} failed: {source}", receipt.destination)]
    CleanupFailed {
        receipt: AppendReceipt,
        temporary: ObjectRef,
        #[source]
        source: StoreError,
    },
}

impl AppendError {
    /// Returns `true` if the destination holds the payload despite the
    /// error. Only a failed cleanup after a successful compose qualifies.
    pub fn destination_mutated(&self) -> bool {
        matches!(self, Self::CleanupFailed { .. })
    }

    /// The receipt of the durable append, if the error happened after it.
    pub fn receipt(&self) -> Option<&AppendReceipt> {
        match self {
            Self::CleanupFailed { receipt, .. } => Some(receipt),
            _ => None,
        }
    }

    /// Returns `true` for errors caused by the caller's context.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::DeadlineExceeded | Self::Cancelled)
    }
}

/// Result alias for append operations.
pub type AppendResult<T> = Result<T, AppendError>;

//! Concurrent-safe appends to objects in a store.
//!
//! Object stores only support whole-object writes. This crate layers an
//! append on top of them using the store's compose primitive and its
//! per-object generation numbers, so any number of writers in any number of
//! processes can append to the same object without a lock.
//!
//! # Protocol
//!
//! 1. Optionally gzip the payload.
//! 2. Write it to a temporary object owned by this call.
//! 3. Create the destination empty if it does not exist.
//! 4. Read the destination generation, then compose
//!    `[destination, temporary]` onto the destination on the condition that
//!    the generation has not moved.
//! 5. On a failed precondition, back off exponentially and retry from 4.
//! 6. Delete the temporary object.
//!
//! Only contention is retried. Every other store failure ends the call.

pub mod appender;
pub mod backoff;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod targets;

pub use appender::Appender;
pub use backoff::{ExponentialBackoff, RetryPolicy};
pub use codec::{gunzip, gzip, GZIP_ENCODING, GZIP_SUFFIX};
pub use config::{AppendConfig, DEFAULT_MAX_BACKOFF};
pub use context::AppendContext;
pub use error::{AppendError, AppendReceipt, AppendResult};
pub use targets::AppendTargets;

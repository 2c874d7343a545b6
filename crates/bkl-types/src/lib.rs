//! Foundation types for Bucketline.
//!
//! Bucketline is a thin coordination layer over a remote object store. This
//! crate holds the vocabulary every other crate speaks: where an object
//! lives, which version of it was observed, and what the store reports
//! about it.
//!
//! # Key Types
//!
//! - [`Locator`] -- a `scheme://bucket/prefix.../name` address, decomposed
//! - [`ObjectRef`] -- bucket + full object name, the store-level identity
//! - [`Generation`] -- opaque version stamp used as a write precondition
//! - [`ObjectAttrs`] -- metadata the store reports for an object

pub mod error;
pub mod locator;
pub mod object;

pub use error::TypeError;
pub use locator::Locator;
pub use object::{Generation, ObjectAttrs, ObjectRef};

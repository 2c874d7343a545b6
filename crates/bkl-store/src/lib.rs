//! Object storage interface for Bucketline.
//!
//! Bucketline assumes a remote store in the style of Google Cloud Storage:
//! whole-object writes, per-object generation numbers usable as write
//! preconditions, and an atomic "compose N objects into one" primitive.
//! This crate defines that capability surface and ships two backends.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- directory-per-bucket store on a local filesystem,
//!   safe for several processes sharing one root
//!
//! # Design Rules
//!
//! 1. Every mutation gives the object a strictly larger generation.
//! 2. A failed generation precondition never mutates anything.
//! 3. Compose is atomic; readers never observe a partial concatenation.
//! 4. "Not found" is a distinct error variant, checked structurally.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod helpers;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use fs::{FsObjectStore, FsStoreConfig};
pub use helpers::{delete_object, has_object, read_object};
pub use memory::InMemoryObjectStore;
pub use traits::{ComposeRequest, ObjectStore, WriteOptions};

//! Locator-based conveniences over any [`ObjectStore`].
//!
//! These take a `scheme://bucket/prefix.../name` string, decompose it, and
//! run one store call against the addressed object.

use bytes::Bytes;

use bkl_types::Locator;

use crate::error::StoreResult;
use crate::traits::ObjectStore;

/// Returns `true` if the object at `url` exists and `false` if it does not.
/// Any failure other than "not found" is returned as an error.
pub async fn has_object<S: ObjectStore + ?Sized>(store: &S, url: &str) -> StoreResult<bool> {
    let object = Locator::parse(url)?.object_ref();
    store.exists(&object).await
}

/// Read the full content of the object at `url`.
pub async fn read_object<S: ObjectStore + ?Sized>(store: &S, url: &str) -> StoreResult<Bytes> {
    let object = Locator::parse(url)?.object_ref();
    store.read(&object).await
}

/// Delete the object at `url`.
pub async fn delete_object<S: ObjectStore + ?Sized>(store: &S, url: &str) -> StoreResult<()> {
    let object = Locator::parse(url)?.object_ref();
    store.delete(&object).await
}

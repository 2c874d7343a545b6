use async_trait::async_trait;
use bytes::Bytes;

use bkl_types::{Generation, ObjectAttrs, ObjectRef};

use crate::error::{StoreError, StoreResult};

/// Options for a whole-object write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Content encoding recorded on the written object.
    pub content_encoding: Option<String>,
    /// Only write if the object's current generation equals this value.
    /// [`Generation::NONE`] means "only if the object does not exist".
    pub if_generation_match: Option<Generation>,
}

impl WriteOptions {
    pub fn with_content_encoding(mut self, encoding: Option<String>) -> Self {
        self.content_encoding = encoding;
        self
    }

    pub fn if_absent(mut self) -> Self {
        self.if_generation_match = Some(Generation::NONE);
        self
    }
}

/// An atomic compose: replace `destination` with the concatenation of
/// `sources`, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposeRequest {
    pub destination: ObjectRef,
    pub sources: Vec<ObjectRef>,
    /// Only compose if the destination's current generation equals this value.
    pub if_generation_match: Option<Generation>,
    /// Content encoding for the result. `None` keeps the destination's.
    pub content_encoding: Option<String>,
}

impl ComposeRequest {
    /// Reject requests no backend can satisfy: no sources, or sources
    /// outside the destination's bucket.
    pub fn validate(&self) -> StoreResult<()> {
        if self.sources.is_empty() {
            return Err(StoreError::InvalidRequest(
                "compose needs at least one source".into(),
            ));
        }
        if let Some(foreign) = self
            .sources
            .iter()
            .find(|s| s.bucket != self.destination.bucket)
        {
            return Err(StoreError::InvalidRequest(format!(
                "compose source {foreign} is not in bucket {}",
                self.destination.bucket
            )));
        }
        Ok(())
    }
}

/// Check a generation precondition against the current generation of an
/// object (`None` when the object does not exist).
pub fn check_generation(
    object: &ObjectRef,
    current: Option<Generation>,
    expected: Option<Generation>,
) -> StoreResult<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let actual = current.unwrap_or(Generation::NONE);
    if actual == expected {
        Ok(())
    } else {
        Err(StoreError::PreconditionFailed {
            object: object.clone(),
            expected,
            actual,
        })
    }
}

/// Remote object storage with per-object generations and atomic compose.
///
/// All implementations must satisfy these invariants:
/// - Every mutation of an object assigns it a strictly larger generation.
/// - A write or compose whose generation precondition does not hold fails
///   with `StoreError::PreconditionFailed` and leaves the object untouched.
/// - Compose is atomic: readers see either the previous content or the full
///   concatenation, never a prefix of it.
/// - Missing objects are reported as `StoreError::NotFound`, distinct from
///   transport or backend failures.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object's metadata.
    async fn attributes(&self, object: &ObjectRef) -> StoreResult<ObjectAttrs>;

    /// Read an object's full content.
    async fn read(&self, object: &ObjectRef) -> StoreResult<Bytes>;

    /// Replace an object's content in full.
    ///
    /// Either every byte of `data` is stored or an error is returned.
    async fn write_all(
        &self,
        object: &ObjectRef,
        data: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<ObjectAttrs>;

    /// Delete an object. Fails with `NotFound` if it does not exist.
    async fn delete(&self, object: &ObjectRef) -> StoreResult<()>;

    /// Atomically compose `request.sources` into `request.destination`.
    async fn compose(&self, request: &ComposeRequest) -> StoreResult<ObjectAttrs>;

    /// List all objects in `bucket` whose names start with `prefix`, sorted
    /// by name.
    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectAttrs>>;

    /// Check whether an object exists.
    ///
    /// Returns `Ok(false)` for a missing object and `Err` for any other
    /// failure, so "absent" is never confused with "unreachable".
    async fn exists(&self, object: &ObjectRef) -> StoreResult<bool> {
        match self.attributes(object).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Append `source` onto `destination` by composing `[destination, source]`
    /// back onto `destination`, only if the destination is still at
    /// `expected`.
    async fn compose_if_generation_matches(
        &self,
        destination: &ObjectRef,
        source: &ObjectRef,
        expected: Generation,
        content_encoding: Option<String>,
    ) -> StoreResult<ObjectAttrs> {
        let request = ComposeRequest {
            destination: destination.clone(),
            sources: vec![destination.clone(), source.clone()],
            if_generation_match: Some(expected),
            content_encoding,
        };
        self.compose(&request).await
    }
}

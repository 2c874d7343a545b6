use bkl_types::{Generation, ObjectRef, TypeError};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectRef),

    /// A generation precondition did not hold; the object was not mutated.
    #[error("precondition failed for {object}: expected generation {expected}, found {actual}")]
    PreconditionFailed {
        object: ObjectRef,
        expected: Generation,
        actual: Generation,
    },

    /// The object name cannot be stored by this backend.
    #[error("invalid object name {name:?}: {reason}")]
    InvalidObjectName { name: String, reason: String },

    /// The request is malformed (e.g. a compose across buckets).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A locator could not be decomposed.
    #[error("locator error: {0}")]
    Locator(#[from] TypeError),

    /// Serialization or deserialization failure of backend metadata.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` if the error reports a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns `true` if the error reports a failed generation precondition.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

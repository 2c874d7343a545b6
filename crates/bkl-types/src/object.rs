use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of one object in the store: a bucket and a full object name.
///
/// Names may contain `/`; the store treats them as flat keys.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub name: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }

    /// A sibling object in the same bucket.
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        Self::new(self.bucket.clone(), name)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}/{})", self.bucket, self.name)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.name)
    }
}

/// Opaque version stamp attached to an object by the store.
///
/// Every mutation of an object gives it a new, larger generation. Callers
/// never interpret the value; they only hand it back as a precondition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    /// Precondition value meaning "the object must not exist yet".
    pub const NONE: Self = Self(0);

    /// The smallest generation strictly after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata the store reports for an object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectAttrs {
    pub bucket: String,
    pub name: String,
    pub generation: Generation,
    /// Content length in bytes.
    pub size: u64,
    /// Content encoding recorded for the object (e.g. `gzip`).
    pub content_encoding: Option<String>,
    /// Time of the last mutation.
    pub updated: DateTime<Utc>,
}

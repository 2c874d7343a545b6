use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::object::ObjectRef;

/// A decomposed object address of the form `scheme://bucket/prefix.../name`.
///
/// The scheme is optional and carried only for display; backends address
/// objects by bucket and full name. The prefix is every segment between the
/// bucket and the final name, joined by `/`, and may be empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub scheme: Option<String>,
    pub bucket: String,
    pub prefix: String,
    pub name: String,
}

impl Locator {
    /// Parse a locator string.
    ///
    /// Fails when the path holds fewer than two segments (bucket and name),
    /// when the bucket is empty, or when the name is empty (trailing `/`).
    /// Empty interior segments are dropped from the prefix.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let (scheme, path) = match input.split_once("://") {
            Some(("", _)) => return Err(TypeError::invalid_locator(input, "empty scheme")),
            Some((scheme, rest)) => (Some(scheme.to_string()), rest),
            None => (None, input),
        };

        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() < 2 {
            return Err(TypeError::invalid_locator(
                input,
                "path does not have bucket and object",
            ));
        }

        let bucket = segments[0];
        if bucket.is_empty() {
            return Err(TypeError::invalid_locator(input, "empty bucket"));
        }
        let name = segments[segments.len() - 1];
        if name.is_empty() {
            return Err(TypeError::invalid_locator(input, "empty object name"));
        }

        let prefix = segments[1..segments.len() - 1]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("/");

        Ok(Self {
            scheme,
            bucket: bucket.to_string(),
            prefix,
            name: name.to_string(),
        })
    }

    /// The full object name within the bucket: `prefix/name`, or `name` when
    /// there is no prefix.
    pub fn object_path(&self) -> String {
        if self.prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.prefix, self.name)
        }
    }

    /// The store-level reference this locator addresses.
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.bucket.clone(), self.object_path())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}://")?;
        }
        write!(f, "{}/{}", self.bucket, self.object_path())
    }
}

impl FromStr for Locator {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

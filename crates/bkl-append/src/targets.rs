use bkl_types::{Locator, ObjectRef};
use uuid::Uuid;

use crate::codec::GZIP_SUFFIX;

/// The two objects one append call works with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendTargets {
    /// The shared object payloads are appended to.
    pub destination: ObjectRef,
    /// The object this call writes its payload to before composing.
    /// Owned by a single call; never shared.
    pub temporary: ObjectRef,
}

impl AppendTargets {
    /// Derive the destination and a fresh temporary name from a locator.
    ///
    /// The temporary name is the destination path plus a UUIDv7 token,
    /// which is unique across concurrent callers and sorts by creation
    /// time. With `gzip`, both names get the `.gz` suffix.
    pub fn derive(locator: &Locator, gzip: bool) -> Self {
        Self::derive_with_token(locator, gzip, &Uuid::now_v7().simple().to_string())
    }

    fn derive_with_token(locator: &Locator, gzip: bool, token: &str) -> Self {
        let path = locator.object_path();
        let suffix = if gzip { GZIP_SUFFIX } else { "" };
        let destination = ObjectRef::new(locator.bucket.clone(), format!("{path}{suffix}"));
        let temporary = destination.sibling(format!("{path}.{token}{suffix}"));
        Self {
            destination,
            temporary,
        }
    }
}

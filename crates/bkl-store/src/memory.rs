use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};

use bkl_types::{Generation, ObjectAttrs, ObjectRef};

use crate::error::{StoreError, StoreResult};
use crate::traits::{check_generation, ComposeRequest, ObjectStore, WriteOptions};

#[derive(Clone, Debug)]
struct StoredEntry {
    data: Bytes,
    generation: Generation,
    content_encoding: Option<String>,
    updated: DateTime<Utc>,
}

impl StoredEntry {
    fn attrs(&self, object: &ObjectRef) -> ObjectAttrs {
        ObjectAttrs {
            bucket: object.bucket.clone(),
            name: object.name.clone(),
            generation: self.generation,
            size: self.data.len() as u64,
            content_encoding: self.content_encoding.clone(),
            updated: self.updated,
        }
    }
}

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock`; every mutation (including the precondition check) happens under
/// the write lock, so compose is atomic. Generations come from one
/// store-wide counter and therefore only ever increase.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectRef, StoredEntry>>,
    last_generation: AtomicU64,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            last_generation: AtomicU64::new(0),
        }
    }

    /// Number of objects currently stored, across all buckets.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Remove all objects from the store.
    pub fn clear(&self) {
        self.objects.write().expect("lock poisoned").clear();
    }

    /// Sorted names of every object in `bucket`.
    pub fn names(&self, bucket: &str) -> Vec<String> {
        let map = self.objects.read().expect("lock poisoned");
        let mut names: Vec<String> = map
            .keys()
            .filter(|r| r.bucket == bucket)
            .map(|r| r.name.clone())
            .collect();
        names.sort();
        names
    }

    fn next_generation(&self) -> Generation {
        Generation(self.last_generation.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn attributes(&self, object: &ObjectRef) -> StoreResult<ObjectAttrs> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(object)
            .map(|entry| entry.attrs(object))
            .ok_or_else(|| StoreError::NotFound(object.clone()))
    }

    async fn read(&self, object: &ObjectRef) -> StoreResult<Bytes> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(object)
            .map(|entry| entry.data.clone())
            .ok_or_else(|| StoreError::NotFound(object.clone()))
    }

    async fn write_all(
        &self,
        object: &ObjectRef,
        data: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<ObjectAttrs> {
        let mut map = self.objects.write().expect("lock poisoned");
        check_generation(
            object,
            map.get(object).map(|e| e.generation),
            options.if_generation_match,
        )?;

        let entry = StoredEntry {
            data: Bytes::copy_from_slice(data),
            generation: self.next_generation(),
            content_encoding: options.content_encoding.clone(),
            updated: Utc::now(),
        };
        let attrs = entry.attrs(object);
        map.insert(object.clone(), entry);
        Ok(attrs)
    }

    async fn delete(&self, object: &ObjectRef) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        map.remove(object)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(object.clone()))
    }

    async fn compose(&self, request: &ComposeRequest) -> StoreResult<ObjectAttrs> {
        request.validate()?;
        let destination = &request.destination;

        let mut map = self.objects.write().expect("lock poisoned");
        let current = map.get(destination);
        check_generation(
            destination,
            current.map(|e| e.generation),
            request.if_generation_match,
        )?;
        let content_encoding = request
            .content_encoding
            .clone()
            .or_else(|| current.and_then(|e| e.content_encoding.clone()));

        let mut data = BytesMut::new();
        for source in &request.sources {
            let entry = map
                .get(source)
                .ok_or_else(|| StoreError::NotFound(source.clone()))?;
            data.extend_from_slice(&entry.data);
        }

        let entry = StoredEntry {
            data: data.freeze(),
            generation: self.next_generation(),
            content_encoding,
            updated: Utc::now(),
        };
        let attrs = entry.attrs(destination);
        map.insert(destination.clone(), entry);
        Ok(attrs)
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectAttrs>> {
        let map = self.objects.read().expect("lock poisoned");
        let mut listed: Vec<ObjectAttrs> = map
            .iter()
            .filter(|(r, _)| r.bucket == bucket && r.name.starts_with(prefix))
            .map(|(r, entry)| entry.attrs(r))
            .collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .finish()
    }
}

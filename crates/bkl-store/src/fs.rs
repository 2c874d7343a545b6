//! Filesystem-backed object store.
//!
//! On-disk layout, per bucket:
//!
//! ```text
//! <root>/<bucket>/<object name>          object content
//! <root>/<bucket>/.bkl/meta/<name>.json  generation, encoding, update time
//! <root>/<bucket>/.bkl/tmp/              staging area for atomic renames
//! <root>/<bucket>/.bkl/lock              bucket lock file
//! ```
//!
//! Every operation holds the bucket lock, so precondition checks and
//! compose are atomic across threads and across processes sharing `root`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use walkdir::WalkDir;

use bkl_types::{Generation, ObjectAttrs, ObjectRef};

use crate::error::{StoreError, StoreResult};
use crate::traits::{check_generation, ComposeRequest, ObjectStore, WriteOptions};

/// Name of the per-bucket bookkeeping directory. Never visible as an object.
const META_DIR: &str = ".bkl";
const LOCK_FILE: &str = "lock";
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Tuning for the bucket lock.
#[derive(Clone, Debug)]
pub struct FsStoreConfig {
    /// How long an operation waits for the bucket lock before failing.
    pub lock_timeout: Duration,
    /// Lock files older than this are assumed abandoned and broken. A held
    /// lock is refreshed well within this window, however long the
    /// operation under it runs.
    pub stale_lock_after: Duration,
}

impl Default for FsStoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(10),
            stale_lock_after: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ObjectMeta {
    generation: Generation,
    content_encoding: Option<String>,
    updated: DateTime<Utc>,
}

/// Object store that keeps buckets as directories under a root path.
#[derive(Clone)]
pub struct FsObjectStore {
    inner: Arc<FsInner>,
}

struct FsInner {
    root: PathBuf,
    config: FsStoreConfig,
}

impl FsObjectStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::with_config(root, FsStoreConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: FsStoreConfig) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened filesystem object store");
        Ok(Self {
            inner: Arc::new(FsInner { root, config }),
        })
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    async fn blocking<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(&FsInner) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || op(&inner))
            .await
            .map_err(|e| StoreError::Backend(format!("blocking task failed: {e}")))?
    }
}

impl std::fmt::Debug for FsObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsObjectStore")
            .field("root", &self.inner.root)
            .finish()
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn attributes(&self, object: &ObjectRef) -> StoreResult<ObjectAttrs> {
        let object = object.clone();
        self.blocking(move |inner| {
            let _lock = inner.lock_bucket(&object.bucket)?;
            inner.load_attrs(&object)
        })
        .await
    }

    async fn read(&self, object: &ObjectRef) -> StoreResult<Bytes> {
        let object = object.clone();
        self.blocking(move |inner| {
            let _lock = inner.lock_bucket(&object.bucket)?;
            inner.read_data(&object).map(Bytes::from)
        })
        .await
    }

    async fn write_all(
        &self,
        object: &ObjectRef,
        data: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<ObjectAttrs> {
        let object = object.clone();
        let data = data.to_vec();
        let options = options.clone();
        self.blocking(move |inner| {
            let _lock = inner.lock_bucket(&object.bucket)?;
            let current = inner.load_meta(&object)?;
            check_generation(
                &object,
                current.as_ref().map(|m| m.generation),
                options.if_generation_match,
            )?;
            inner.store(&object, &data, current.map(|m| m.generation), options.content_encoding)
        })
        .await
    }

    async fn delete(&self, object: &ObjectRef) -> StoreResult<()> {
        let object = object.clone();
        self.blocking(move |inner| {
            let _lock = inner.lock_bucket(&object.bucket)?;
            fs::remove_file(inner.data_path(&object)?).map_err(not_found_as(&object))?;
            match fs::remove_file(inner.meta_path(&object)?) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    async fn compose(&self, request: &ComposeRequest) -> StoreResult<ObjectAttrs> {
        request.validate()?;
        let request = request.clone();
        self.blocking(move |inner| {
            let destination = &request.destination;
            let _lock = inner.lock_bucket(&destination.bucket)?;

            let current = inner.load_meta(destination)?;
            check_generation(
                destination,
                current.as_ref().map(|m| m.generation),
                request.if_generation_match,
            )?;

            let mut data = Vec::new();
            for source in &request.sources {
                data.extend_from_slice(&inner.read_data(source)?);
            }

            let content_encoding = request
                .content_encoding
                .clone()
                .or_else(|| current.as_ref().and_then(|m| m.content_encoding.clone()));
            inner.store(
                destination,
                &data,
                current.map(|m| m.generation),
                content_encoding,
            )
        })
        .await
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectAttrs>> {
        let bucket = bucket.to_string();
        let prefix = prefix.to_string();
        self.blocking(move |inner| {
            let bucket_dir = inner.bucket_dir(&bucket)?;
            if !bucket_dir.is_dir() {
                return Ok(Vec::new());
            }
            let _lock = inner.lock_bucket(&bucket)?;

            let mut listed = Vec::new();
            let walker = WalkDir::new(&bucket_dir)
                .min_depth(1)
                .into_iter()
                .filter_entry(|e| !(e.depth() == 1 && e.file_name() == META_DIR));
            for entry in walker {
                let entry = entry.map_err(|e| StoreError::Backend(e.to_string()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(name) = object_name(&bucket_dir, entry.path()) else {
                    continue;
                };
                if name.starts_with(&prefix) {
                    listed.push(inner.load_attrs(&ObjectRef::new(bucket.clone(), name))?);
                }
            }
            listed.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(listed)
        })
        .await
    }
}

impl FsInner {
    fn bucket_dir(&self, bucket: &str) -> StoreResult<PathBuf> {
        validate_bucket(bucket)?;
        Ok(self.root.join(bucket))
    }

    fn data_path(&self, object: &ObjectRef) -> StoreResult<PathBuf> {
        validate_name(&object.name)?;
        Ok(self.bucket_dir(&object.bucket)?.join(&object.name))
    }

    fn meta_path(&self, object: &ObjectRef) -> StoreResult<PathBuf> {
        validate_name(&object.name)?;
        Ok(self
            .bucket_dir(&object.bucket)?
            .join(META_DIR)
            .join("meta")
            .join(format!("{}.json", object.name)))
    }

    fn lock_bucket(&self, bucket: &str) -> StoreResult<BucketLock> {
        let meta_dir = self.bucket_dir(bucket)?.join(META_DIR);
        fs::create_dir_all(&meta_dir)?;
        BucketLock::acquire(meta_dir.join(LOCK_FILE), &self.config)
    }

    fn read_data(&self, object: &ObjectRef) -> StoreResult<Vec<u8>> {
        fs::read(self.data_path(object)?).map_err(not_found_as(object))
    }

    fn load_meta(&self, object: &ObjectRef) -> StoreResult<Option<ObjectMeta>> {
        let data_path = self.data_path(object)?;
        if !data_path.is_file() {
            return Ok(None);
        }
        match fs::read(self.meta_path(object)?) {
            Ok(raw) => serde_json::from_slice(&raw)
                .map(Some)
                .map_err(|e| StoreError::Serialization(e.to_string())),
            // Content placed in the bucket by hand: derive metadata from the file.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let modified = fs::metadata(&data_path)?.modified()?;
                Ok(Some(ObjectMeta {
                    generation: Generation(micros_since_epoch(modified)),
                    content_encoding: None,
                    updated: DateTime::<Utc>::from(modified),
                }))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn load_attrs(&self, object: &ObjectRef) -> StoreResult<ObjectAttrs> {
        let meta = self
            .load_meta(object)?
            .ok_or_else(|| StoreError::NotFound(object.clone()))?;
        let size = fs::metadata(self.data_path(object)?)
            .map_err(not_found_as(object))?
            .len();
        Ok(ObjectAttrs {
            bucket: object.bucket.clone(),
            name: object.name.clone(),
            generation: meta.generation,
            size,
            content_encoding: meta.content_encoding,
            updated: meta.updated,
        })
    }

    /// Replace content and metadata. Caller holds the bucket lock.
    fn store(
        &self,
        object: &ObjectRef,
        data: &[u8],
        previous: Option<Generation>,
        content_encoding: Option<String>,
    ) -> StoreResult<ObjectAttrs> {
        let updated = Utc::now();
        let generation = next_generation(previous, updated);
        let meta = ObjectMeta {
            generation,
            content_encoding: content_encoding.clone(),
            updated,
        };
        let meta_json =
            serde_json::to_vec(&meta).map_err(|e| StoreError::Serialization(e.to_string()))?;

        let staging = self.bucket_dir(&object.bucket)?.join(META_DIR).join("tmp");
        write_atomically(&staging, &self.data_path(object)?, data)?;
        write_atomically(&staging, &self.meta_path(object)?, &meta_json)?;

        debug!(object = %object, generation = %generation, size = data.len(), "stored object");
        Ok(ObjectAttrs {
            bucket: object.bucket.clone(),
            name: object.name.clone(),
            generation,
            size: data.len() as u64,
            content_encoding,
            updated,
        })
    }
}

/// Exclusive lock on one bucket, held as a create-new lock file.
///
/// A heartbeat thread bumps the file's mtime while the lock is held, so
/// other processes never break it as stale mid-operation.
#[derive(Debug)]
struct BucketLock {
    path: PathBuf,
    heartbeat: Option<Heartbeat>,
}

impl BucketLock {
    fn acquire(path: PathBuf, config: &FsStoreConfig) -> StoreResult<Self> {
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    let mut lock = Self {
                        path,
                        heartbeat: None,
                    };
                    // On spawn failure, dropping `lock` releases the file.
                    lock.heartbeat = Heartbeat::start(file, config.stale_lock_after)?;
                    return Ok(lock);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path, config.stale_lock_after) {
                        warn!(lock = %path.display(), "breaking stale bucket lock");
                        match fs::remove_file(&path) {
                            Ok(()) => continue,
                            Err(e) if e.kind() == ErrorKind::NotFound => continue,
                            Err(e) => return Err(e.into()),
                        }
                    }
                    if started.elapsed() >= config.lock_timeout {
                        return Err(StoreError::Backend(format!(
                            "timed out after {:?} waiting for bucket lock {}",
                            config.lock_timeout,
                            path.display()
                        )));
                    }
                    std::thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Drop for BucketLock {
    fn drop(&mut self) {
        if let Some(heartbeat) = self.heartbeat.take() {
            heartbeat.stop();
        }
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(lock = %self.path.display(), error = %e, "failed to release bucket lock");
        }
    }
}

/// Keeps a held lock file's mtime fresh until stopped.
#[derive(Debug)]
struct Heartbeat {
    stop: mpsc::Sender<()>,
    thread: JoinHandle<()>,
}

impl Heartbeat {
    /// No heartbeat when `stale_after` is zero; such locks are always stale.
    fn start(file: File, stale_after: Duration) -> io::Result<Option<Self>> {
        if stale_after.is_zero() {
            return Ok(None);
        }
        let interval = (stale_after / 3).max(LOCK_POLL_INTERVAL);
        let (stop, stopped) = mpsc::channel::<()>();
        let thread = std::thread::Builder::new()
            .name("bkl-lock-heartbeat".into())
            .spawn(move || {
                while let Err(RecvTimeoutError::Timeout) = stopped.recv_timeout(interval) {
                    if let Err(e) = file.set_modified(SystemTime::now()) {
                        warn!(error = %e, "failed to refresh bucket lock");
                    }
                }
            })?;
        Ok(Some(Self { stop, thread }))
    }

    fn stop(self) {
        drop(self.stop);
        if self.thread.join().is_err() {
            warn!("bucket lock heartbeat panicked");
        }
    }
}

fn is_stale(path: &Path, stale_after: Duration) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|modified| modified.elapsed().unwrap_or_default() > stale_after)
        .unwrap_or(false)
}

fn write_atomically(staging: &Path, target: &Path, data: &[u8]) -> io::Result<()> {
    fs::create_dir_all(staging)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = NamedTempFile::new_in(staging)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Generations are microsecond timestamps, forced strictly past the
/// previous value.
fn next_generation(previous: Option<Generation>, now: DateTime<Utc>) -> Generation {
    let stamp = Generation(now.timestamp_micros().max(1) as u64);
    match previous {
        Some(prev) if prev >= stamp => prev.next(),
        _ => stamp,
    }
}

fn micros_since_epoch(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).unwrap_or_default().as_micros() as u64
}

fn not_found_as(object: &ObjectRef) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |e| {
        if e.kind() == ErrorKind::NotFound {
            StoreError::NotFound(object.clone())
        } else {
            StoreError::Io(e)
        }
    }
}

fn object_name(bucket_dir: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(bucket_dir).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(s) => segments.push(s.to_str()?.to_string()),
            _ => return None,
        }
    }
    Some(segments.join("/"))
}

fn validate_bucket(bucket: &str) -> StoreResult<()> {
    if bucket.is_empty() || bucket == "." || bucket == ".." || bucket.contains(['/', '\\']) {
        return Err(StoreError::InvalidObjectName {
            name: bucket.to_string(),
            reason: "not a usable bucket name".into(),
        });
    }
    Ok(())
}

fn validate_name(name: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidObjectName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("empty name"));
    }
    if name.contains('\\') {
        return Err(invalid("backslash in name"));
    }
    for (i, segment) in name.split('/').enumerate() {
        match segment {
            "" => return Err(invalid("empty path segment")),
            "." | ".." => return Err(invalid("relative path segment")),
            META_DIR if i == 0 => return Err(invalid("reserved name")),
            _ => {}
        }
    }
    Ok(())
}

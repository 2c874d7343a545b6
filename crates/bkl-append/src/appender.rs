use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use bkl_store::{ObjectStore, StoreError, WriteOptions};
use bkl_types::{Generation, Locator, ObjectAttrs};

use crate::codec::{self, GZIP_ENCODING};
use crate::config::AppendConfig;
use crate::context::AppendContext;
use crate::error::{AppendError, AppendReceipt, AppendResult};
use crate::targets::AppendTargets;

/// Outcome of one conditional compose.
enum Attempt {
    Composed(ObjectAttrs),
    /// Another writer moved the destination past the generation we read.
    Contended { expected: Generation },
}

/// Appends payloads to objects in a store without client-side locking.
///
/// Each call writes its payload to a private temporary object and then
/// composes `[destination, temporary]` back onto the destination,
/// conditioned on the destination generation read just before. A failed
/// precondition means another appender won the race; the call backs off
/// and tries again against the new generation. Every payload ends up in
/// the destination exactly once; the order between concurrent callers is
/// unspecified.
pub struct Appender<S: ObjectStore + ?Sized> {
    store: Arc<S>,
    config: AppendConfig,
}

impl<S: ObjectStore + ?Sized> Appender<S> {
    pub fn new(store: Arc<S>, config: AppendConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AppendConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Append `payload` to the object addressed by `url`
    /// (`scheme://bucket/prefix.../name`).
    pub async fn append(
        &self,
        ctx: &AppendContext,
        payload: &[u8],
        url: &str,
    ) -> AppendResult<AppendReceipt> {
        let locator = Locator::parse(url)?;
        self.append_to(ctx, payload, &locator).await
    }

    /// Append `payload` to the object addressed by `locator`.
    pub async fn append_to(
        &self,
        ctx: &AppendContext,
        payload: &[u8],
        locator: &Locator,
    ) -> AppendResult<AppendReceipt> {
        let max_backoff = self.config.effective_max_backoff();

        let (body, encoding) = if self.config.gzip {
            let encoded = codec::gzip(payload).map_err(AppendError::Compression)?;
            (encoded, Some(GZIP_ENCODING.to_string()))
        } else {
            (payload.to_vec(), None)
        };

        let targets = AppendTargets::derive(locator, self.config.gzip);
        self.write_temporary(&targets, &body, encoding.clone()).await?;
        self.ensure_destination(&targets, encoding).await?;

        if ctx.is_cancelled() {
            return Err(AppendError::Cancelled);
        }
        if ctx.is_expired() {
            return Err(AppendError::DeadlineExceeded);
        }

        let started = Instant::now();
        // A budget too large to represent as an instant means no budget.
        let budget_deadline = started.checked_add(max_backoff);
        let (deadline, caller_bound) = match (ctx.deadline(), budget_deadline) {
            (Some(d), Some(b)) if d < b => (Some(d), true),
            (Some(d), None) => (Some(d), true),
            (_, b) => (b, false),
        };

        let mut backoff = self.config.retry.start();
        let mut attempts: u32 = 0;
        let attrs = loop {
            attempts += 1;
            match self.compose_once(&targets).await? {
                Attempt::Composed(attrs) => break attrs,
                Attempt::Contended { expected } => {
                    let delay = backoff.next_delay();
                    debug!(
                        destination = %targets.destination,
                        attempt = attempts,
                        expected = %expected,
                        delay_ms = delay.as_millis() as u64,
                        "compose contended, backing off"
                    );
                    let overruns = deadline.is_some_and(|d| {
                        Instant::now().checked_add(delay).map_or(true, |wake| wake > d)
                    });
                    if overruns {
                        return Err(if caller_bound {
                            AppendError::DeadlineExceeded
                        } else {
                            AppendError::RetryExhausted {
                                attempts,
                                elapsed: started.elapsed(),
                            }
                        });
                    }
                    tokio::select! {
                        _ = ctx.cancelled() => return Err(AppendError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        };

        let receipt = AppendReceipt {
            destination: targets.destination.clone(),
            generation: attrs.generation,
            size: attrs.size,
            content_encoding: attrs.content_encoding,
            attempts,
            elapsed: started.elapsed(),
        };

        if let Err(source) = self.store.delete(&targets.temporary).await {
            warn!(
                destination = %targets.destination,
                temporary = %targets.temporary,
                error = %source,
                "append succeeded but temporary object was not deleted"
            );
            return Err(AppendError::CleanupFailed {
                receipt,
                temporary: targets.temporary,
                source,
            });
        }

        info!(
            destination = %receipt.destination,
            generation = %receipt.generation,
            bytes = body.len(),
            attempts,
            "appended"
        );
        Ok(receipt)
    }

    async fn write_temporary(
        &self,
        targets: &AppendTargets,
        body: &[u8],
        encoding: Option<String>,
    ) -> AppendResult<()> {
        let options = WriteOptions::default()
            .with_content_encoding(encoding)
            .if_absent();
        let attrs = self
            .store
            .write_all(&targets.temporary, body, &options)
            .await
            .map_err(|source| AppendError::TemporaryWrite {
                object: targets.temporary.clone(),
                source,
            })?;
        if attrs.size != body.len() as u64 {
            return Err(AppendError::ShortWrite {
                object: targets.temporary.clone(),
                written: attrs.size,
                expected: body.len() as u64,
            });
        }
        Ok(())
    }

    /// Create the destination empty if it does not exist yet.
    async fn ensure_destination(
        &self,
        targets: &AppendTargets,
        encoding: Option<String>,
    ) -> AppendResult<()> {
        let destination = &targets.destination;
        match self.store.attributes(destination).await {
            Ok(_) => return Ok(()),
            Err(e) if e.is_not_found() => {}
            Err(source) => {
                return Err(AppendError::Destination {
                    object: destination.clone(),
                    source,
                })
            }
        }

        let options = WriteOptions::default()
            .with_content_encoding(encoding)
            .if_absent();
        match self.store.write_all(destination, &[], &options).await {
            Ok(_) => {
                debug!(destination = %destination, "created empty destination");
                Ok(())
            }
            // Another appender created it first.
            Err(e) if e.is_precondition_failed() => Ok(()),
            Err(source) => Err(AppendError::Destination {
                object: destination.clone(),
                source,
            }),
        }
    }

    async fn compose_once(&self, targets: &AppendTargets) -> AppendResult<Attempt> {
        let compose_err = |source: StoreError| AppendError::Compose {
            object: targets.destination.clone(),
            source,
        };

        let current = self
            .store
            .attributes(&targets.destination)
            .await
            .map_err(compose_err)?;
        let temporary = self
            .store
            .attributes(&targets.temporary)
            .await
            .map_err(compose_err)?;

        match self
            .store
            .compose_if_generation_matches(
                &targets.destination,
                &targets.temporary,
                current.generation,
                temporary.content_encoding,
            )
            .await
        {
            Ok(attrs) => Ok(Attempt::Composed(attrs)),
            Err(e) if e.is_precondition_failed() => Ok(Attempt::Contended {
                expected: current.generation,
            }),
            Err(source) => Err(compose_err(source)),
        }
    }
}

impl<S: ObjectStore + ?Sized> std::fmt::Debug for Appender<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Appender")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;

    use bkl_store::{ComposeRequest, InMemoryObjectStore, StoreResult};
    use bkl_types::ObjectRef;

    use super::*;
    use crate::backoff::RetryPolicy;

    const URL: &str = "gs://bkt/logs/app.log";

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            initial_interval: Duration::from_millis(1),
            multiplier: 2.0,
            randomization_factor: 0.5,
            max_interval: Duration::from_millis(20),
        }
    }

    fn fixed_retry(interval: Duration) -> RetryPolicy {
        RetryPolicy {
            initial_interval: interval,
            multiplier: 1.0,
            randomization_factor: 0.0,
            max_interval: interval,
        }
    }

    fn destination() -> ObjectRef {
        ObjectRef::new("bkt", "logs/app.log")
    }

    /// In-memory store with injectable failures.
    #[derive(Default)]
    struct Scripted {
        inner: InMemoryObjectStore,
        /// Composes to reject as contended before delegating.
        contend: AtomicU32,
        compose_calls: AtomicU32,
        fail_compose: AtomicBool,
        fail_delete: AtomicBool,
        short_write: AtomicBool,
        /// Payload another writer lands on the destination right before our
        /// first compose, and the generation that write produced.
        rival: Mutex<Option<Vec<u8>>>,
        rival_generation: Mutex<Option<Generation>>,
    }

    impl Scripted {
        fn composes(&self) -> u32 {
            self.compose_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectStore for Scripted {
        async fn attributes(&self, object: &ObjectRef) -> StoreResult<ObjectAttrs> {
            self.inner.attributes(object).await
        }

        async fn read(&self, object: &ObjectRef) -> StoreResult<Bytes> {
            self.inner.read(object).await
        }

        async fn write_all(
            &self,
            object: &ObjectRef,
            data: &[u8],
            options: &WriteOptions,
        ) -> StoreResult<ObjectAttrs> {
            if self.short_write.load(Ordering::SeqCst) && !data.is_empty() {
                return self.inner.write_all(object, &data[..data.len() - 1], options).await;
            }
            self.inner.write_all(object, data, options).await
        }

        async fn delete(&self, object: &ObjectRef) -> StoreResult<()> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("delete refused".into()));
            }
            self.inner.delete(object).await
        }

        async fn compose(&self, request: &ComposeRequest) -> StoreResult<ObjectAttrs> {
            self.compose_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_compose.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("compose refused".into()));
            }
            let rival = self.rival.lock().expect("lock poisoned").take();
            if let Some(payload) = rival {
                let destination = &request.destination;
                let temporary = destination.sibling(format!("{}.rival", destination.name));
                self.inner
                    .write_all(&temporary, &payload, &WriteOptions::default())
                    .await?;
                let current = self.inner.attributes(destination).await?;
                let landed = self
                    .inner
                    .compose_if_generation_matches(destination, &temporary, current.generation, None)
                    .await?;
                self.inner.delete(&temporary).await?;
                *self.rival_generation.lock().expect("lock poisoned") = Some(landed.generation);
            }
            let remaining = self.contend.load(Ordering::SeqCst);
            if remaining > 0 {
                self.contend.store(remaining - 1, Ordering::SeqCst);
                let current = self.inner.attributes(&request.destination).await?;
                return Err(StoreError::PreconditionFailed {
                    object: request.destination.clone(),
                    expected: request.if_generation_match.unwrap_or(Generation::NONE),
                    actual: current.generation.next(),
                });
            }
            self.inner.compose(request).await
        }

        async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectAttrs>> {
            self.inner.list(bucket, prefix).await
        }
    }

    // ---- Basic protocol ----

    #[tokio::test]
    async fn first_append_creates_destination() {
        let store = Arc::new(InMemoryObjectStore::new());
        let appender = Appender::new(store.clone(), AppendConfig::default());

        let receipt = appender
            .append(&AppendContext::background(), b"hello\n", URL)
            .await
            .unwrap();

        assert_eq!(receipt.destination, destination());
        assert_eq!(receipt.size, 6);
        assert_eq!(receipt.attempts, 1);
        assert_eq!(store.read(&destination()).await.unwrap(), &b"hello\n"[..]);
        assert_eq!(store.names("bkt"), vec!["logs/app.log".to_string()]);
    }

    #[tokio::test]
    async fn appends_accumulate_in_order_for_one_caller() {
        let store = Arc::new(InMemoryObjectStore::new());
        let appender = Appender::new(store.clone(), AppendConfig::default());
        let ctx = AppendContext::background();

        appender.append(&ctx, b"one,", URL).await.unwrap();
        appender.append(&ctx, b"two,", URL).await.unwrap();
        let last = appender.append(&ctx, b"three", URL).await.unwrap();

        assert_eq!(store.read(&destination()).await.unwrap(), &b"one,two,three"[..]);
        assert_eq!(last.size, 13);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn existing_destination_is_extended() {
        let store = Arc::new(InMemoryObjectStore::new());
        store
            .write_all(&destination(), b"seed|", &WriteOptions::default())
            .await
            .unwrap();
        let appender = Appender::new(store.clone(), AppendConfig::default());

        appender
            .append(&AppendContext::background(), b"more", URL)
            .await
            .unwrap();

        assert_eq!(store.read(&destination()).await.unwrap(), &b"seed|more"[..]);
    }

    #[tokio::test]
    async fn empty_payload_is_a_valid_append() {
        let store = Arc::new(InMemoryObjectStore::new());
        let appender = Appender::new(store.clone(), AppendConfig::default());

        let receipt = appender
            .append(&AppendContext::background(), b"", URL)
            .await
            .unwrap();
        assert_eq!(receipt.size, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn malformed_url_is_rejected_before_any_write() {
        let store = Arc::new(InMemoryObjectStore::new());
        let appender = Appender::new(store.clone(), AppendConfig::default());

        let err = appender
            .append(&AppendContext::background(), b"x", "gs://bucket-only")
            .await
            .unwrap_err();
        assert!(matches!(err, AppendError::Locator(_)));
        assert!(store.is_empty());
    }

    // ---- Compression ----

    #[tokio::test]
    async fn gzip_round_trip() {
        let store = Arc::new(InMemoryObjectStore::new());
        let appender = Appender::new(store.clone(), AppendConfig::default().with_gzip(true));
        let ctx = AppendContext::background();

        appender.append(&ctx, b"first line\n", URL).await.unwrap();
        let receipt = appender.append(&ctx, b"second line\n", URL).await.unwrap();

        let gz = ObjectRef::new("bkt", "logs/app.log.gz");
        assert_eq!(receipt.destination, gz);
        assert_eq!(receipt.content_encoding.as_deref(), Some(GZIP_ENCODING));
        assert_eq!(store.names("bkt"), vec!["logs/app.log.gz".to_string()]);

        let attrs = store.attributes(&gz).await.unwrap();
        assert_eq!(attrs.content_encoding.as_deref(), Some(GZIP_ENCODING));

        let stored = store.read(&gz).await.unwrap();
        let plain = codec::gunzip(&stored).unwrap();
        assert_eq!(plain, b"first line\nsecond line\n");
    }

    // ---- Concurrency ----

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_each_land_exactly_once() {
        let store = Arc::new(InMemoryObjectStore::new());
        let appender = Arc::new(Appender::new(
            store.clone(),
            AppendConfig::default().with_retry(fast_retry()),
        ));

        let mut handles = Vec::new();
        for i in 0..16 {
            let appender = appender.clone();
            handles.push(tokio::spawn(async move {
                let payload = format!("<{i:02}>");
                appender
                    .append(&AppendContext::background(), payload.as_bytes(), URL)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let content = store.read(&destination()).await.unwrap();
        let content = std::str::from_utf8(&content).unwrap();
        assert_eq!(content.len(), 16 * 4);

        let chunks: Vec<&str> = (0..16).map(|i| &content[i * 4..i * 4 + 4]).collect();
        let seen: HashSet<&str> = chunks.iter().copied().collect();
        assert_eq!(seen.len(), 16);
        for i in 0..16 {
            assert!(seen.contains(format!("<{i:02}>").as_str()));
        }

        // No temporaries left behind.
        assert_eq!(store.names("bkt"), vec!["logs/app.log".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn contention_is_retried_without_mutating() {
        let store = Arc::new(Scripted::default());
        store.contend.store(3, Ordering::SeqCst);
        let appender = Appender::new(
            store.clone(),
            AppendConfig::default().with_retry(fixed_retry(Duration::from_millis(100))),
        );

        let receipt = appender
            .append(&AppendContext::background(), b"payload", URL)
            .await
            .unwrap();

        assert_eq!(receipt.attempts, 4);
        assert_eq!(store.composes(), 4);
        assert_eq!(store.read(&destination()).await.unwrap(), &b"payload"[..]);
        assert_eq!(store.inner.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn competing_compose_is_kept_and_retried_against() {
        let store = Arc::new(Scripted::default());
        let seeded = store
            .inner
            .write_all(&destination(), b"seed|", &WriteOptions::default())
            .await
            .unwrap()
            .generation;
        *store.rival.lock().unwrap() = Some(b"other|".to_vec());
        let appender = Appender::new(
            store.clone(),
            AppendConfig::default().with_retry(fixed_retry(Duration::from_millis(100))),
        );

        let receipt = appender
            .append(&AppendContext::background(), b"payload", URL)
            .await
            .unwrap();

        assert_eq!(receipt.attempts, 2);
        assert_eq!(store.composes(), 2);
        assert_eq!(
            store.read(&destination()).await.unwrap(),
            &b"seed|other|payload"[..]
        );
        let rival = store.rival_generation.lock().unwrap().unwrap();
        assert!(seeded < rival);
        assert!(rival < receipt.generation);
        assert_eq!(store.inner.len(), 1);
    }

    // ---- Deadlines and budget ----

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_budget_retries_until_success() {
        let store = Arc::new(Scripted::default());
        store.contend.store(2, Ordering::SeqCst);
        let config = AppendConfig::default()
            .with_max_backoff(Duration::from_secs(u64::MAX))
            .with_retry(fixed_retry(Duration::from_secs(1)));
        let appender = Appender::new(store.clone(), config);

        let receipt = appender
            .append(&AppendContext::background(), b"x", URL)
            .await
            .unwrap();
        assert_eq!(receipt.attempts, 3);
        assert_eq!(store.inner.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn caller_deadline_binds_when_budget_is_unrepresentable() {
        let store = Arc::new(Scripted::default());
        store.contend.store(u32::MAX, Ordering::SeqCst);
        let config = AppendConfig::default()
            .with_max_backoff(Duration::from_secs(u64::MAX))
            .with_retry(fixed_retry(Duration::from_secs(1)));
        let appender = Appender::new(store.clone(), config);
        let ctx = AppendContext::with_timeout(Duration::from_millis(2_500));

        let err = appender.append(&ctx, b"x", URL).await.unwrap_err();
        assert!(matches!(err, AppendError::DeadlineExceeded));
        assert_eq!(store.composes(), 3);
    }

    #[tokio::test]
    async fn past_deadline_fails_without_composing() {
        let store = Arc::new(Scripted::default());
        let appender = Appender::new(store.clone(), AppendConfig::default());
        let ctx = AppendContext::with_deadline(Instant::now() - Duration::from_millis(1));

        let err = appender.append(&ctx, b"late", URL).await.unwrap_err();

        assert!(matches!(err, AppendError::DeadlineExceeded));
        assert!(!err.destination_mutated());
        assert_eq!(store.composes(), 0);
        assert_eq!(store.read(&destination()).await.unwrap(), &b""[..]);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_budget_exhaustion() {
        let store = Arc::new(Scripted::default());
        store.contend.store(u32::MAX, Ordering::SeqCst);
        let config = AppendConfig::default()
            .with_max_backoff(Duration::from_secs(5))
            .with_retry(fixed_retry(Duration::from_secs(1)));
        let appender = Appender::new(store.clone(), config);

        let err = appender
            .append(&AppendContext::background(), b"never", URL)
            .await
            .unwrap_err();

        match err {
            AppendError::RetryExhausted { attempts, elapsed } => {
                assert_eq!(attempts, 6);
                assert_eq!(elapsed, Duration::from_secs(5));
            }
            other => panic!("expected RetryExhausted, got {other:?}"),
        }
        assert_eq!(store.read(&destination()).await.unwrap(), &b""[..]);
        // The temporary object is left behind.
        assert_eq!(store.inner.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn caller_deadline_tighter_than_budget() {
        let store = Arc::new(Scripted::default());
        store.contend.store(u32::MAX, Ordering::SeqCst);
        let config = AppendConfig::default()
            .with_max_backoff(Duration::from_secs(60))
            .with_retry(fixed_retry(Duration::from_secs(1)));
        let appender = Appender::new(store.clone(), config);
        let ctx = AppendContext::with_timeout(Duration::from_millis(2_500));

        let err = appender.append(&ctx, b"x", URL).await.unwrap_err();

        assert!(matches!(err, AppendError::DeadlineExceeded));
        assert_eq!(store.composes(), 3);
    }

    // ---- Cancellation ----

    #[tokio::test]
    async fn cancelled_before_loop() {
        let store = Arc::new(Scripted::default());
        let appender = Appender::new(store.clone(), AppendConfig::default());
        let ctx = AppendContext::background();
        ctx.cancel();

        let err = appender.append(&ctx, b"x", URL).await.unwrap_err();
        assert!(matches!(err, AppendError::Cancelled));
        assert_eq!(store.composes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_during_backoff() {
        let store = Arc::new(Scripted::default());
        store.contend.store(u32::MAX, Ordering::SeqCst);
        let appender = Appender::new(
            store.clone(),
            AppendConfig::default().with_retry(fixed_retry(Duration::from_secs(1))),
        );
        let ctx = AppendContext::background();

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1_500)).await;
            canceller.cancel();
        });

        let err = appender.append(&ctx, b"x", URL).await.unwrap_err();
        assert!(matches!(err, AppendError::Cancelled));
        assert_eq!(store.composes(), 2);
    }

    // ---- Terminal failures ----

    #[tokio::test]
    async fn non_contention_compose_error_is_terminal() {
        let store = Arc::new(Scripted::default());
        store.fail_compose.store(true, Ordering::SeqCst);
        let appender = Appender::new(store.clone(), AppendConfig::default());

        let err = appender
            .append(&AppendContext::background(), b"x", URL)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppendError::Compose {
                source: StoreError::Backend(_),
                ..
            }
        ));
        assert_eq!(store.composes(), 1);
    }

    #[tokio::test]
    async fn short_write_is_fatal() {
        let store = Arc::new(Scripted::default());
        store.short_write.store(true, Ordering::SeqCst);
        let appender = Appender::new(store.clone(), AppendConfig::default());

        let err = appender
            .append(&AppendContext::background(), b"abcdef", URL)
            .await
            .unwrap_err();

        match err {
            AppendError::ShortWrite {
                written, expected, ..
            } => {
                assert_eq!(written, 5);
                assert_eq!(expected, 6);
            }
            other => panic!("expected ShortWrite, got {other:?}"),
        }
        assert_eq!(store.composes(), 0);
    }

    #[tokio::test]
    async fn cleanup_failure_still_reports_durable_append() {
        let store = Arc::new(Scripted::default());
        store.fail_delete.store(true, Ordering::SeqCst);
        let appender = Appender::new(store.clone(), AppendConfig::default());

        let err = appender
            .append(&AppendContext::background(), b"kept", URL)
            .await
            .unwrap_err();

        assert!(err.destination_mutated());
        let receipt = err.receipt().unwrap();
        assert_eq!(receipt.destination, destination());
        assert_eq!(receipt.size, 4);
        assert_eq!(store.read(&destination()).await.unwrap(), &b"kept"[..]);
        assert_eq!(store.inner.len(), 2);
    }

    #[tokio::test]
    async fn works_through_a_trait_object() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        let appender = Appender::new(store.clone(), AppendConfig::default());

        appender
            .append(&AppendContext::background(), b"dyn", URL)
            .await
            .unwrap();
        assert_eq!(store.read(&destination()).await.unwrap(), &b"dyn"[..]);
    }
}

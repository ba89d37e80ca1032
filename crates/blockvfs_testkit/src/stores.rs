//! Instrumented object stores.
//!
//! [`RecordingStore`] logs every request so tests can check how many round
//! trips an operation costs and in which order blocks are touched.
//! [`FaultyStore`] fails requests on demand, standing in for an unreachable
//! or throttling bucket.

use blockvfs_store::{ObjectMeta, ObjectStore, StoreError, StoreResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// One request seen by a [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `get(key)`.
    Get(String),
    /// `put(key, data)` with the data length.
    Put(String, usize),
    /// `delete(key)`.
    Delete(String),
    /// `delete_prefix(prefix)`.
    DeletePrefix(String),
    /// `list(prefix)`.
    List(String),
}

impl Request {
    /// Returns the key or prefix the request addressed.
    pub fn key(&self) -> &str {
        match self {
            Self::Get(k) | Self::Put(k, _) | Self::Delete(k) | Self::DeletePrefix(k) | Self::List(k) => k,
        }
    }
}

/// A store wrapper that records every request before forwarding it.
#[derive(Debug, Default)]
pub struct RecordingStore<S> {
    inner: S,
    log: Mutex<Vec<Request>>,
}

impl<S: ObjectStore> RecordingStore<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a copy of every recorded request, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().clone()
    }

    /// Returns and clears the recorded requests.
    pub fn take(&self) -> Vec<Request> {
        std::mem::take(&mut *self.log.lock())
    }

    /// Number of recorded `get` requests.
    pub fn gets(&self) -> usize {
        self.count(|r| matches!(r, Request::Get(_)))
    }

    /// Number of recorded `put` requests.
    pub fn puts(&self) -> usize {
        self.count(|r| matches!(r, Request::Put(..)))
    }

    /// Number of recorded `list` requests.
    pub fn lists(&self) -> usize {
        self.count(|r| matches!(r, Request::List(_)))
    }

    fn count(&self, f: impl Fn(&Request) -> bool) -> usize {
        self.log.lock().iter().filter(|r| f(r)).count()
    }

    fn record(&self, request: Request) {
        self.log.lock().push(request);
    }
}

impl<S: ObjectStore> ObjectStore for RecordingStore<S> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.record(Request::Get(key.to_owned()));
        self.inner.get(key)
    }

    fn put(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.record(Request::Put(key.to_owned(), data.len()));
        self.inner.put(key, data)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.record(Request::Delete(key.to_owned()));
        self.inner.delete(key)
    }

    fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        self.record(Request::DeletePrefix(prefix.to_owned()));
        self.inner.delete_prefix(prefix)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        self.record(Request::List(prefix.to_owned()));
        self.inner.list(prefix)
    }
}

/// A store wrapper that fails requests on demand.
///
/// Failures are reported as [`StoreError::Unavailable`], like a transport
/// error from a remote bucket.
#[derive(Debug, Default)]
pub struct FaultyStore<S> {
    inner: S,
    offline: AtomicBool,
    puts_left: AtomicUsize,
    limit_puts: AtomicBool,
    fail_gets: AtomicBool,
}

impl<S: ObjectStore> FaultyStore<S> {
    /// Wraps `inner`; no faults are armed.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            offline: AtomicBool::new(false),
            puts_left: AtomicUsize::new(0),
            limit_puts: AtomicBool::new(false),
            fail_gets: AtomicBool::new(false),
        }
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Fails every request while `offline` is true.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Lets `n` more puts through, then fails every further put.
    pub fn fail_puts_after(&self, n: usize) {
        self.puts_left.store(n, Ordering::SeqCst);
        self.limit_puts.store(true, Ordering::SeqCst);
    }

    /// Fails every get while `fail` is true.
    pub fn set_fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    /// Disarms every fault.
    pub fn heal(&self) {
        self.offline.store(false, Ordering::SeqCst);
        self.limit_puts.store(false, Ordering::SeqCst);
        self.fail_gets.store(false, Ordering::SeqCst);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("bucket offline".into()));
        }
        Ok(())
    }
}

impl<S: ObjectStore> ObjectStore for FaultyStore<S> {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.check_online()?;
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("get {key} throttled")));
        }
        self.inner.get(key)
    }

    fn put(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.check_online()?;
        if self.limit_puts.load(Ordering::SeqCst) {
            let allowed = self
                .puts_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if !allowed {
                return Err(StoreError::Unavailable(format!("put {key} refused")));
            }
        }
        self.inner.put(key, data)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.check_online()?;
        self.inner.delete(key)
    }

    fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        self.check_online()?;
        self.inner.delete_prefix(prefix)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<ObjectMeta>> {
        self.check_online()?;
        self.inner.list(prefix)
    }
}

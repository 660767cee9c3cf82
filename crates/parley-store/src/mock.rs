use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use parley_core::ids::SessionId;
use parley_core::session::SessionRecord;

use crate::error::StoreError;
use crate::memory::MemorySessionStore;
use crate::store::SessionStore;

/// In-memory store that counts calls and can be told to fail.
#[derive(Default)]
pub struct MockSessionStore {
    inner: MemorySessionStore,
    get_count: AtomicUsize,
    put_count: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record directly, bypassing the call counters.
    pub async fn seed(&self, record: SessionRecord) {
        // The memory store never fails.
        let _ = self.inner.put(&record).await;
    }

    /// Read a record directly, bypassing the call counters.
    pub async fn peek(&self, session_id: &str) -> Option<SessionRecord> {
        self.inner.get(&SessionId::from_raw(session_id)).await.ok().flatten()
    }

    pub fn get_count(&self) -> usize {
        self.get_count.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.put_count.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        self.inner.get(session_id).await
    }

    async fn put(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.put_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".into()));
        }
        self.inner.put(record).await
    }
}

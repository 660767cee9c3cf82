use async_trait::async_trait;
use dashmap::DashMap;

use parley_core::ids::SessionId;
use parley_core::session::SessionRecord;

use crate::error::StoreError;
use crate::store::SessionStore;

/// Process-local session store. Records are lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    records: DashMap<SessionId, SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, session_id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.records.get(session_id).map(|r| r.value().clone()))
    }

    async fn put(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.records.insert(record.session_id.clone(), record.clone());
        Ok(())
    }
}

use async_trait::async_trait;

use parley_core::ids::SessionId;
use parley_core::session::SessionRecord;

use crate::error::StoreError;

/// Point storage for session records, keyed by session id.
///
/// `get` on an unknown id is `Ok(None)`, never an error. `put` overwrites
/// whatever is stored under the key, unconditionally: the last writer wins
/// and there is no version check. Implementations do not retry.
#[async_trait]
pub trait SessionStore: Send + Sync {
    fn name(&self) -> &str;

    async fn get(&self, session_id: &SessionId) -> Result<Option<SessionRecord>, StoreError>;

    async fn put(&self, record: &SessionRecord) -> Result<(), StoreError>;
}

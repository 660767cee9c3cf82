use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::ids::SessionId;
use crate::messages::Turn;

/// The persisted conversation for one session. Written as a whole on every
/// exchange; there is no partial update.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub history: Vec<Turn>,
    /// Epoch seconds of the last write.
    pub last_updated: i64,
}

impl SessionRecord {
    /// Build a record stamped with the current time.
    pub fn now(session_id: SessionId, history: Vec<Turn>) -> Self {
        Self {
            session_id,
            history,
            last_updated: Utc::now().timestamp(),
        }
    }
}

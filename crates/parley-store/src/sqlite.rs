use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use parley_core::ids::SessionId;
use parley_core::messages::Turn;
use parley_core::session::SessionRecord;
use parley_settings::is_valid_table_name;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;
use crate::schema;
use crate::store::SessionStore;

/// Session store backed by a single SQLite table.
///
/// `history` is stored as a JSON array of turns so a row maps one-to-one
/// onto a [`SessionRecord`]. Queries run on the blocking pool.
pub struct SqliteSessionStore {
    db: Database,
    table: Arc<str>,
    select_sql: Arc<str>,
    upsert_sql: Arc<str>,
}

impl SqliteSessionStore {
    /// Create the store, creating its table if needed.
    pub fn new(db: Database, table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(StoreError::InvalidTableName(table));
        }

        db.with_conn(|conn| {
            conn.execute_batch(&schema::create_sessions_table(&table))
                .map_err(|e| StoreError::Database(format!("schema: {e}")))
        })?;

        Ok(Self {
            select_sql: schema::select_session(&table).into(),
            upsert_sql: schema::upsert_session(&table).into(),
            db,
            table: table.into(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

fn row_to_record(row: &rusqlite::Row<'_>, table: &str) -> Result<SessionRecord, StoreError> {
    let history_raw: String = row_helpers::get(row, 1, table, "history")?;
    let history: Vec<Turn> = row_helpers::parse_json(&history_raw, table, "history")?;

    Ok(SessionRecord {
        session_id: SessionId::from_raw(row_helpers::get::<String>(row, 0, table, "session_id")?),
        history,
        last_updated: row_helpers::get(row, 2, table, "last_updated")?,
    })
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    #[instrument(skip(self), fields(session_id = %session_id, table = %self.table))]
    async fn get(&self, session_id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let sql = Arc::clone(&self.select_sql);
        let table = Arc::clone(&self.table);
        let id = session_id.as_str().to_owned();
        self.db
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                let mut rows = stmt.query([id.as_str()])?;
                match rows.next()? {
                    Some(row) => row_to_record(row, &table).map(Some),
                    None => Ok(None),
                }
            })
            .await
    }

    #[instrument(skip(self, record), fields(session_id = %record.session_id, table = %self.table, history_len = record.history.len()))]
    async fn put(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let history = serde_json::to_string(&record.history)?;
        let sql = Arc::clone(&self.upsert_sql);
        let id = record.session_id.as_str().to_owned();
        let last_updated = record.last_updated;
        self.db
            .call(move |conn| {
                conn.execute(&sql, rusqlite::params![id, history, last_updated])?;
                Ok(())
            })
            .await
    }
}

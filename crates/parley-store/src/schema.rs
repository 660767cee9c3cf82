//! SQL for the session table. The table name is configurable, so the
//! statements are rendered per store with the name quoted as an identifier.

/// Stamped into `PRAGMA user_version` on first open.
pub const SCHEMA_VERSION: i64 = 1;

pub const PRAGMAS: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
"#;

/// Quote `name` as an SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn create_sessions_table(table: &str) -> String {
    let table = quote_ident(table);
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
    session_id TEXT PRIMARY KEY,
    history TEXT NOT NULL,
    last_updated INTEGER NOT NULL
);"
    )
}

pub fn select_session(table: &str) -> String {
    let table = quote_ident(table);
    format!("SELECT session_id, history, last_updated FROM {table} WHERE session_id = ?1")
}

pub fn upsert_session(table: &str) -> String {
    let table = quote_ident(table);
    format!(
        "INSERT INTO {table} (session_id, history, last_updated) VALUES (?1, ?2, ?3)
         ON CONFLICT(session_id) DO UPDATE SET
             history = excluded.history,
             last_updated = excluded.last_updated"
    )
}

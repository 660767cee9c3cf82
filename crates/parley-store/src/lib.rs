pub mod database;
pub mod error;
pub mod memory;
pub mod row_helpers;
pub mod schema;
pub mod sqlite;
pub mod store;

pub mod mock;

pub use database::Database;
pub use error::StoreError;
pub use memory::MemorySessionStore;
pub use mock::MockSessionStore;
pub use sqlite::SqliteSessionStore;
pub use store::SessionStore;

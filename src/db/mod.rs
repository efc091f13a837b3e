//! Database module for Keepsake
//!
//! Provides SQLite storage for memories.

pub mod schema;

use crate::error::Result;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Database manager guarding a single SQLite connection
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    /// Create a new database connection
    pub fn new(db_path: PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;

        // Initialize schema
        schema::init_db(&conn)?;

        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
            path: db_path,
        })
    }

    /// Create an in-memory database (tests, embedding)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::init_db(&conn)?;

        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Run a closure against the connection on the blocking thread pool.
    ///
    /// SQLite calls are synchronous; this keeps them off the async runtime.
    pub async fn with_conn<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&Connection) -> T + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            f(&conn)
        })
        .await
        .expect("database task panicked")
    }

    /// Get the database file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

// Re-export schema for convenience
pub use schema::init_db;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_creation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test_keepsake.db");

        let db = Database::new(db_path);
        assert!(db.is_ok());
    }

    #[tokio::test]
    async fn test_with_conn_roundtrip() {
        let db = Database::in_memory().unwrap();

        let inserted = db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO memories (id, user_id, content, cover_url, is_public, created_at)
                     VALUES (?, ?, ?, ?, ?, ?)",
                    rusqlite::params![
                        "6f9619ff-8b86-4d01-b42d-00c04fc964ff",
                        "e00124fd-8336-4902-858c-0050dfda92b5",
                        "hello",
                        "https://x.com/a.png",
                        false,
                        "2024-01-01T00:00:00+00:00"
                    ],
                )
            })
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let count: i64 = db
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}

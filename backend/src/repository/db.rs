//! Database Connection and Setup
//!
//! Manages the SQLite connection, migrations and account registration.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, UserId};
use super::session::SqliteBackend;
use super::sql::{now_micros, parse_id};

/// Database state wrapper
///
/// Cheap to clone; every clone and every session shares one connection.
#[derive(Clone)]
pub struct DbState {
    pub(crate) conn: Arc<Mutex<Option<Connection>>>,
}

impl DbState {
    pub fn new() -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether `init_db` has attached a connection yet
    pub async fn is_initialized(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Drop the connection; sessions fail with `Internal` afterwards
    pub async fn close(&self) {
        self.conn.lock().await.take();
    }

    /// Create an account. Emails are unique regardless of case.
    pub async fn register_user(&self, email: &str) -> DomainResult<UserId> {
        let email = normalize_email(email)?;

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;

        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)",
                params![email],
                |row| row.get(0),
            )?;
        if exists {
            return Err(DomainError::Conflict(format!("{} is already registered", email)));
        }

        let id = UserId::new();
        conn.execute(
            "INSERT INTO users (id, email, created_at) VALUES (?, ?, ?)",
            params![id.to_string(), email, now_micros()],
        )?;
        log::info!("Registered user {}", id);
        Ok(id)
    }

    /// Look up an account without going through a session
    pub async fn find_user(&self, email: &str) -> DomainResult<Option<UserId>> {
        let email = normalize_email(email)?;

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;

        let id: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?",
                params![email],
                |row| row.get(0),
            )
            .optional()?;
        id.map(|s| parse_id(&s)).transpose()
    }

    /// A backend session acting as `user_id`
    pub fn session(&self, user_id: UserId) -> SqliteBackend {
        SqliteBackend::new(self.conn.clone(), Some(user_id))
    }

    /// A backend session with no identity attached
    pub fn anonymous(&self) -> SqliteBackend {
        SqliteBackend::new(self.conn.clone(), None)
    }
}

impl Default for DbState {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim and lowercase an email, rejecting obviously malformed ones
pub(crate) fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(DomainError::InvalidInput(format!("invalid email address: {:?}", email))),
    }
}

/// Initialize database with path
///
/// `":memory:"` opens a private in-memory database.
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let conn = if db_path == Path::new(":memory:") {
        Connection::open_in_memory()
    } else {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| DomainError::internal(format!("Failed to create db dir: {}", e)))?;
        }
        Connection::open(db_path)
    }
    .map_err(|e| DomainError::internal(format!("Failed to open db: {}", e)))?;

    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    run_migrations(&conn)?;
    log::info!("Database ready at {}", db_path.display());

    let state = DbState::new();
    *state.conn.lock().await = Some(conn);
    Ok(state)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS lists (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS list_items (
            id TEXT PRIMARY KEY,
            list_id TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS shared_lists (
            list_id TEXT NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
            shared_with TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (list_id, shared_with)
        );

        CREATE INDEX IF NOT EXISTS idx_lists_owner ON lists(user_id);
        CREATE INDEX IF NOT EXISTS idx_items_list ON list_items(list_id);
        CREATE INDEX IF NOT EXISTS idx_shared_with ON shared_lists(shared_with);",
    )
    .map_err(|e| DomainError::internal(format!("Migration failed: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Bob@Example.COM ").unwrap(), "bob@example.com");
        assert!(normalize_email("").is_err());
        assert!(normalize_email("bob").is_err());
        assert!(normalize_email("@example.com").is_err());
    }

    #[tokio::test]
    async fn test_uninitialized_state_rejects_queries() {
        let state = DbState::new();
        assert!(!state.is_initialized().await);
        let err = state.register_user("a@example.com").await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("checkmate.db");

        let first = init_db(&path).await.expect("first init");
        let id = first.register_user("a@example.com").await.unwrap();
        first.close().await;

        let second = init_db(&path).await.expect("second init");
        assert_eq!(second.find_user("A@example.com").await.unwrap(), Some(id));
    }
}

//! Backend Session
//!
//! A connection handle bound to one identity. All row-level policies are
//! evaluated against that identity.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, ListId, UserId};
use super::sql::parse_id;
use super::traits::AuthOperations;

/// How the session identity relates to a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListAccess {
    Owner,
    Grantee,
}

/// SQLite implementation of the backend contract
#[derive(Clone)]
pub struct SqliteBackend {
    pub(super) conn: Arc<Mutex<Option<Connection>>>,
    identity: Option<UserId>,
}

impl SqliteBackend {
    pub(crate) fn new(conn: Arc<Mutex<Option<Connection>>>, identity: Option<UserId>) -> Self {
        Self { conn, identity }
    }

    /// The identity this session was opened with
    pub fn identity(&self) -> Option<UserId> {
        self.identity
    }

    /// Identity for policy checks; a session whose account vanished is
    /// treated as anonymous
    pub(super) fn require_identity(&self, conn: &Connection) -> DomainResult<UserId> {
        let user_id = self.identity.ok_or(DomainError::Unauthenticated)?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;
        if exists {
            Ok(user_id)
        } else {
            Err(DomainError::Unauthenticated)
        }
    }
}

/// Owner of a list, `None` if the list doesn't exist
pub(super) fn list_owner(conn: &Connection, list_id: ListId) -> DomainResult<Option<UserId>> {
    let owner: Option<String> = conn
        .query_row(
            "SELECT user_id FROM lists WHERE id = ?",
            params![list_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    owner.map(|s| parse_id(&s)).transpose()
}

/// Resolve the caller's access to a list.
///
/// Lists the caller can't see are reported as `NotFound`, just like lists
/// that don't exist.
pub(super) fn list_access(conn: &Connection, list_id: ListId, user_id: UserId) -> DomainResult<ListAccess> {
    let owner = list_owner(conn, list_id)?
        .ok_or_else(|| DomainError::NotFound(format!("list {}", list_id)))?;
    if owner == user_id {
        return Ok(ListAccess::Owner);
    }

    let granted: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM shared_lists WHERE list_id = ? AND shared_with = ?)",
        params![list_id.to_string(), user_id.to_string()],
        |row| row.get(0),
    )?;
    if granted {
        Ok(ListAccess::Grantee)
    } else {
        Err(DomainError::NotFound(format!("list {}", list_id)))
    }
}

/// Like `list_access` but only the owner passes
pub(super) fn require_owner(conn: &Connection, list_id: ListId, user_id: UserId) -> DomainResult<()> {
    match list_access(conn, list_id, user_id)? {
        ListAccess::Owner => Ok(()),
        ListAccess::Grantee => Err(DomainError::Forbidden(format!(
            "only the owner may modify list {}",
            list_id
        ))),
    }
}

#[async_trait]
impl AuthOperations for SqliteBackend {
    async fn current_identity(&self) -> DomainResult<Option<UserId>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;

        match self.require_identity(conn) {
            Ok(user_id) => Ok(Some(user_id)),
            Err(DomainError::Unauthenticated) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

//! Share Repository
//!
//! Grants on the `shared_lists` table plus the two sharing procedures.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use crate::domain::{DomainError, DomainResult, Grantee, ListId, ShareGrant, UserId};
use super::db::normalize_email;
use super::session::{list_access, list_owner, require_owner, SqliteBackend};
use super::sql::parse_id;
use super::traits::ShareOperations;

#[async_trait]
impl ShareOperations for SqliteBackend {
    async fn insert_grant(&self, grant: &ShareGrant) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;
        require_owner(conn, grant.list_id, me)?;

        if grant.shared_with == me {
            return Err(DomainError::Conflict("a list can't be shared with its owner".into()));
        }
        let user_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)",
            params![grant.shared_with.to_string()],
            |row| row.get(0),
        )?;
        if !user_exists {
            return Err(DomainError::NotFound(format!("user {}", grant.shared_with)));
        }

        let inserted = conn.execute(
            "INSERT OR IGNORE INTO shared_lists (list_id, shared_with) VALUES (?, ?)",
            params![grant.list_id.to_string(), grant.shared_with.to_string()],
        )?;
        if inserted == 0 {
            return Err(DomainError::Conflict("list is already shared with this user".into()));
        }
        log::debug!("Shared list {} with {}", grant.list_id, grant.shared_with);
        Ok(())
    }

    async fn delete_grant(&self, list_id: ListId, user_id: UserId) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;

        // Owners revoke anyone; grantees may only leave
        let owner = list_owner(conn, list_id)?
            .ok_or_else(|| DomainError::NotFound(format!("list {}", list_id)))?;
        if owner != me && user_id != me {
            return Err(DomainError::Forbidden(format!(
                "only the owner may revoke grants on list {}",
                list_id
            )));
        }

        let removed = conn.execute(
            "DELETE FROM shared_lists WHERE list_id = ? AND shared_with = ?",
            params![list_id.to_string(), user_id.to_string()],
        )?;
        if removed == 0 {
            return Err(DomainError::NotFound(format!(
                "grant of list {} to {}",
                list_id, user_id
            )));
        }
        log::debug!("Revoked grant of list {} to {}", list_id, user_id);
        Ok(())
    }

    async fn resolve_identity_by_email(&self, email: &str) -> DomainResult<Option<UserId>> {
        let email = normalize_email(email)?;

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        self.require_identity(conn)?;

        let id: Option<String> = conn
            .query_row("SELECT id FROM users WHERE email = ?", params![email], |row| row.get(0))
            .optional()?;
        id.map(|s| parse_id(&s)).transpose()
    }

    async fn list_grantees(&self, list_id: ListId) -> DomainResult<Vec<Grantee>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;
        list_access(conn, list_id, me)?;

        let mut stmt = conn.prepare(
            "SELECT u.id, u.email FROM shared_lists s
             JOIN users u ON u.id = s.shared_with
             WHERE s.list_id = ?
             ORDER BY u.email ASC",
        )?;
        let mut rows = stmt.query(params![list_id.to_string()])?;

        let mut grantees = Vec::new();
        while let Some(row) = rows.next()? {
            grantees.push(Grantee {
                user_id: parse_id(&row.get::<_, String>(0)?)?,
                email: row.get(1)?,
            });
        }
        Ok(grantees)
    }
}

//! List Repository
//!
//! `ListOperations` for the SQLite backend.

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection};

use crate::domain::{DomainError, DomainResult, ListId, ListRow, UserId};
use super::session::{require_owner, SqliteBackend};
use super::sql::{from_micros, parse_id, placeholders, stored_now, to_micros};
use super::traits::ListOperations;

const LIST_COLUMNS: &str = "l.id, l.title, l.user_id, l.created_at";

/// Row filter: the list is owned by or shared with the session identity
/// (bound as the last parameter).
const VISIBLE: &str = "(l.user_id = ?{me} OR EXISTS (
    SELECT 1 FROM shared_lists s WHERE s.list_id = l.id AND s.shared_with = ?{me}))";

fn visible_to(param: usize) -> String {
    VISIBLE.replace("{me}", &param.to_string())
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::InvalidInput("list title must not be empty".into()));
    }
    Ok(())
}

/// Convert a database row to ListRow
pub(super) fn row_to_list(row: &rusqlite::Row) -> DomainResult<ListRow> {
    Ok(ListRow {
        id: parse_id(&row.get::<_, String>(0)?)?,
        title: row.get(1)?,
        user_id: parse_id(&row.get::<_, String>(2)?)?,
        created_at: from_micros(row.get(3)?)?,
    })
}

pub(super) fn find_list(conn: &Connection, id: ListId) -> DomainResult<ListRow> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM lists l WHERE l.id = ?", LIST_COLUMNS))?;
    let mut rows = stmt.query(params![id.to_string()])?;
    let list = match rows.next()? {
        Some(row) => row_to_list(row)?,
        None => return Err(DomainError::NotFound(format!("list {}", id))),
    };
    Ok(list)
}

#[async_trait]
impl ListOperations for SqliteBackend {
    async fn granted_list_ids(&self, user_id: UserId) -> DomainResult<Vec<ListId>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;

        let mut stmt = conn.prepare(
            "SELECT s.list_id FROM shared_lists s
             JOIN lists l ON l.id = s.list_id
             WHERE s.shared_with = ?1 AND (s.shared_with = ?2 OR l.user_id = ?2)",
        )?;
        let mut rows = stmt.query(params![user_id.to_string(), me.to_string()])?;

        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(parse_id(&row.get::<_, String>(0)?)?);
        }
        Ok(ids)
    }

    async fn owned_lists(&self, user_id: UserId) -> DomainResult<Vec<ListRow>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;

        let sql = format!(
            "SELECT {} FROM lists l WHERE l.user_id = ?1 AND {}
             ORDER BY l.created_at DESC, l.rowid DESC",
            LIST_COLUMNS,
            visible_to(2)
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![user_id.to_string(), me.to_string()])?;

        let mut lists = Vec::new();
        while let Some(row) = rows.next()? {
            lists.push(row_to_list(row)?);
        }
        Ok(lists)
    }

    async fn lists_by_ids(&self, ids: &[ListId]) -> DomainResult<Vec<ListRow>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;

        let sql = format!(
            "SELECT {} FROM lists l WHERE l.id IN ({}) AND {}
             ORDER BY l.created_at DESC, l.rowid DESC",
            LIST_COLUMNS,
            placeholders(ids.len()),
            visible_to(ids.len() + 1)
        );
        let mut stmt = conn.prepare(&sql)?;
        let values = ids
            .iter()
            .map(ToString::to_string)
            .chain(std::iter::once(me.to_string()));
        let mut rows = stmt.query(params_from_iter(values))?;

        let mut lists = Vec::new();
        while let Some(row) = rows.next()? {
            lists.push(row_to_list(row)?);
        }
        Ok(lists)
    }

    async fn insert_list(&self, title: &str, user_id: UserId) -> DomainResult<ListRow> {
        validate_title(title)?;

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;
        if me != user_id {
            return Err(DomainError::Forbidden("lists can only be created for yourself".into()));
        }

        let mut list = ListRow::new(title.to_string(), user_id);
        list.created_at = stored_now()?;
        conn.execute(
            "INSERT INTO lists (id, title, user_id, created_at) VALUES (?, ?, ?, ?)",
            params![
                list.id.to_string(),
                list.title,
                list.user_id.to_string(),
                to_micros(&list.created_at)
            ],
        )?;
        log::debug!("Inserted list {} for {}", list.id, user_id);
        Ok(list)
    }

    async fn update_list_title(&self, id: ListId, title: &str) -> DomainResult<ListRow> {
        validate_title(title)?;

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;
        require_owner(conn, id, me)?;

        conn.execute(
            "UPDATE lists SET title = ? WHERE id = ?",
            params![title, id.to_string()],
        )?;
        find_list(conn, id)
    }

    async fn delete_list(&self, id: ListId) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;
        require_owner(conn, id, me)?;

        // Items and grants go with it (ON DELETE CASCADE)
        conn.execute("DELETE FROM lists WHERE id = ?", params![id.to_string()])?;
        log::debug!("Deleted list {}", id);
        Ok(())
    }
}

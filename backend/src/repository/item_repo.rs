//! Item Repository
//!
//! `ItemOperations` for the SQLite backend. Owners and grantees of a list
//! may read and modify its items.

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::domain::{DomainError, DomainResult, ItemId, ItemPatch, ItemRow, ListId};
use super::session::{list_access, SqliteBackend};
use super::sql::{from_micros, parse_id, stored_now, to_micros};
use super::traits::ItemOperations;

const ITEM_COLUMNS: &str = "i.id, i.list_id, i.content, i.completed, i.created_at";

fn validate_content(content: &str) -> DomainResult<()> {
    if content.trim().is_empty() {
        return Err(DomainError::InvalidInput("item content must not be empty".into()));
    }
    Ok(())
}

/// Convert a database row to ItemRow
pub(super) fn row_to_item(row: &rusqlite::Row) -> DomainResult<ItemRow> {
    Ok(ItemRow {
        id: parse_id(&row.get::<_, String>(0)?)?,
        list_id: parse_id(&row.get::<_, String>(1)?)?,
        content: row.get(2)?,
        completed: row.get::<_, i64>(3)? != 0,
        created_at: from_micros(row.get(4)?)?,
    })
}

fn find_item(conn: &Connection, id: ItemId) -> DomainResult<ItemRow> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM list_items i WHERE i.id = ?", ITEM_COLUMNS))?;
    let mut rows = stmt.query(params![id.to_string()])?;
    let item = match rows.next()? {
        Some(row) => row_to_item(row)?,
        None => return Err(DomainError::NotFound(format!("item {}", id))),
    };
    Ok(item)
}

/// Find an item the caller may touch; invisible items are `NotFound`
fn find_accessible_item(backend: &SqliteBackend, conn: &Connection, id: ItemId) -> DomainResult<ItemRow> {
    let me = backend.require_identity(conn)?;
    let item = find_item(conn, id)?;
    match list_access(conn, item.list_id, me) {
        Ok(_) => Ok(item),
        Err(DomainError::NotFound(_)) => Err(DomainError::NotFound(format!("item {}", id))),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl ItemOperations for SqliteBackend {
    async fn items_for_list(&self, list_id: ListId) -> DomainResult<Vec<ItemRow>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;

        // Invisible lists simply yield no rows
        let sql = format!(
            "SELECT {} FROM list_items i
             JOIN lists l ON l.id = i.list_id
             WHERE i.list_id = ?1 AND (l.user_id = ?2 OR EXISTS (
                 SELECT 1 FROM shared_lists s WHERE s.list_id = l.id AND s.shared_with = ?2))
             ORDER BY i.created_at ASC, i.rowid ASC",
            ITEM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![list_id.to_string(), me.to_string()])?;

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(row_to_item(row)?);
        }
        Ok(items)
    }

    async fn insert_item(&self, list_id: ListId, content: &str) -> DomainResult<ItemRow> {
        validate_content(content)?;

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;
        list_access(conn, list_id, me)?;

        let mut item = ItemRow::new(list_id, content.to_string());
        item.created_at = stored_now()?;
        conn.execute(
            "INSERT INTO list_items (id, list_id, content, completed, created_at) VALUES (?, ?, ?, 0, ?)",
            params![
                item.id.to_string(),
                item.list_id.to_string(),
                item.content,
                to_micros(&item.created_at)
            ],
        )?;
        log::debug!("Inserted item {} into list {}", item.id, list_id);
        Ok(item)
    }

    async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> DomainResult<ItemRow> {
        patch.validate()?;
        if let Some(content) = &patch.content {
            validate_content(content)?;
        }

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        find_accessible_item(self, conn, id)?;

        conn.execute(
            "UPDATE list_items
             SET content = COALESCE(?, content), completed = COALESCE(?, completed)
             WHERE id = ?",
            params![patch.content, patch.completed, id.to_string()],
        )?;
        find_item(conn, id)
    }

    async fn delete_item(&self, id: ItemId) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        find_accessible_item(self, conn, id)?;

        conn.execute("DELETE FROM list_items WHERE id = ?", params![id.to_string()])?;
        Ok(())
    }

    async fn delete_completed_items(&self, list_id: ListId) -> DomainResult<u64> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(|| DomainError::internal("Database not initialized"))?;
        let me = self.require_identity(conn)?;
        list_access(conn, list_id, me)?;

        let removed = conn.execute(
            "DELETE FROM list_items WHERE list_id = ? AND completed = 1",
            params![list_id.to_string()],
        )?;
        log::debug!("Cleared {} completed items from list {}", removed, list_id);
        Ok(removed as u64)
    }
}

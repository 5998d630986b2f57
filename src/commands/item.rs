//! Item Commands

use checkmate_backend::ListId;

use super::{non_blank, settle};
use crate::models::{ItemId, ItemUpdate, ListItem};
use crate::store::ListStore;

/// Completion summary of a list card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListProgress {
    pub completed: usize,
    pub total: usize,
}

impl ListProgress {
    /// 0.0 to 100.0; an empty list is at 0
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Add an item; blank content is ignored
pub async fn add_item(store: &ListStore, list_id: ListId, content: &str) -> Option<ListItem> {
    let content = non_blank(content)?;
    settle("add_item", store.create_item(list_id, content).await)
}

/// Edit an item's text; blank content is ignored
pub async fn edit_item(store: &ListStore, item_id: ItemId, content: &str) {
    let Some(content) = non_blank(content) else {
        return;
    };
    settle("edit_item", store.update_item(item_id, ItemUpdate::content(content)).await);
}

/// Flip the completed flag of a cached item
pub async fn toggle_item(store: &ListStore, item: &ListItem) {
    settle(
        "toggle_item",
        store.update_item(item.id, ItemUpdate::completed(!item.completed)).await,
    );
}

pub async fn remove_item(store: &ListStore, item_id: ItemId, list_id: ListId) {
    settle("remove_item", store.delete_item(item_id, list_id).await);
}

/// Number of cached completed items a clear would remove
pub fn completed_count(store: &ListStore, list_id: ListId) -> usize {
    progress(store, list_id).completed
}

pub fn progress(store: &ListStore, list_id: ListId) -> ListProgress {
    let items = store.items(list_id).unwrap_or_default();
    ListProgress {
        completed: items.iter().filter(|i| i.completed).count(),
        total: items.len(),
    }
}

/// Remove completed items; nothing happens when none are cached
pub async fn clear_completed(store: &ListStore, list_id: ListId) {
    if completed_count(store, list_id) == 0 {
        return;
    }
    settle("clear_completed", store.clear_completed_items(list_id).await);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(ListProgress { completed: 0, total: 0 }.percentage(), 0.0);
        assert_eq!(ListProgress { completed: 1, total: 4 }.percentage(), 25.0);
        assert_eq!(ListProgress { completed: 3, total: 3 }.percentage(), 100.0);
    }
}

//! List Commands

use checkmate_backend::ListId;

use super::{non_blank, settle};
use crate::models::List;
use crate::store::ListStore;

/// Load the lists screen
pub async fn load_lists(store: &ListStore) {
    settle("load_lists", store.fetch_lists().await);
}

/// Create a list; blank titles are ignored
pub async fn create_list(store: &ListStore, title: &str) -> Option<List> {
    let title = non_blank(title)?;
    settle("create_list", store.create_list(title).await)
}

/// Rename a list; blank or unchanged titles are ignored
pub async fn rename_list(store: &ListStore, list_id: ListId, title: &str) {
    let Some(title) = non_blank(title) else {
        return;
    };
    if store.list(list_id).is_some_and(|list| list.title == title) {
        return;
    }
    settle("rename_list", store.update_list(list_id, title).await);
}

pub async fn delete_list(store: &ListStore, list_id: ListId) {
    settle("delete_list", store.delete_list(list_id).await);
}

/// Stop seeing a list someone shared with you
pub async fn leave_list(store: &ListStore, list_id: ListId) {
    settle("leave_list", store.remove_self_from_list(list_id).await);
}

/// Load what a list card shows: its items and, for owners, its grantees
pub async fn observe_list(store: &ListStore, list: &List) {
    settle("observe_list", store.fetch_items(list.id).await);
    if list.is_owner {
        settle("observe_list", store.fetch_shared_users(list.id).await);
    }
}

//! Share Commands

use checkmate_backend::{ListId, UserId};

use super::{non_blank, settle};
use crate::store::ListStore;

/// Share a list by email. Blank emails are ignored; failures are returned
/// as a message suitable for an alert.
pub async fn share_list(store: &ListStore, list_id: ListId, email: &str) -> Result<(), String> {
    let Some(email) = non_blank(email) else {
        return Ok(());
    };
    store
        .share_list(list_id, email)
        .await
        .map_err(|e| e.to_string())
}

/// Revoke someone's access to a list you own
pub async fn unshare_list(store: &ListStore, list_id: ListId, user_id: UserId) {
    settle("unshare_list", store.unshare_list(list_id, user_id).await);
}

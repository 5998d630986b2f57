//! Client Models
//!
//! View types held by the store, derived from backend rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use checkmate_backend::{Entity, Grantee, ListId, ListRow, UserId};

pub use checkmate_backend::{ItemId, ItemPatch as ItemUpdate, ItemRow as ListItem};

/// A list as seen by the current identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub title: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    /// The current identity created this list
    pub is_owner: bool,
    /// The list reached the current identity through a share grant
    pub is_shared: bool,
}

impl List {
    /// A list the caller owns
    pub fn owned(row: ListRow) -> Self {
        Self::from_row(row, true)
    }

    /// A list granted to the caller
    pub fn shared(row: ListRow) -> Self {
        Self::from_row(row, false)
    }

    fn from_row(row: ListRow, is_owner: bool) -> Self {
        Self {
            id: row.id,
            title: row.title,
            user_id: row.user_id,
            created_at: row.created_at,
            is_owner,
            is_shared: !is_owner,
        }
    }

    /// Take the backend columns of `row`, keeping the derived flags
    pub fn refresh(&mut self, row: ListRow) {
        self.id = row.id;
        self.title = row.title;
        self.user_id = row.user_id;
        self.created_at = row.created_at;
    }
}

impl Entity for List {
    type Id = ListId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Position of the entity with `id` in a cached sequence
pub(crate) fn position<E: Entity>(rows: &[E], id: E::Id) -> Option<usize> {
    rows.iter().position(|row| row.id() == id)
}

/// A grantee of a list as shown to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedUser {
    pub user_id: UserId,
    pub email: String,
}

impl From<Grantee> for SharedUser {
    fn from(grantee: Grantee) -> Self {
        Self {
            user_id: grantee.user_id,
            email: grantee.email,
        }
    }
}

/// Newest first
pub(crate) fn sort_lists(lists: &mut [List]) {
    lists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_flags() {
        let row = ListRow::new("Groceries".into(), UserId::new());
        let owned = List::owned(row.clone());
        assert!(owned.is_owner && !owned.is_shared);
        let shared = List::shared(row);
        assert!(!shared.is_owner && shared.is_shared);
    }

    #[test]
    fn test_sort_newest_first() {
        let owner = UserId::new();
        let mut old = ListRow::new("old".into(), owner);
        old.created_at = old.created_at - Duration::hours(1);
        let new = ListRow::new("new".into(), owner);

        let mut lists = vec![List::owned(old), List::shared(new)];
        sort_lists(&mut lists);
        assert_eq!(lists[0].title, "new");
        assert_eq!(lists[1].title, "old");
    }
}

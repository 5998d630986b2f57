//! List Entity
//!
//! A titled container of items owned by a single user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::ids::{ListId, UserId};

/// A row of the `lists` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRow {
    pub id: ListId,
    pub title: String,
    /// Owner (creator) of the list
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl ListRow {
    pub fn new(title: String, user_id: UserId) -> Self {
        Self {
            id: ListId::new(),
            title,
            user_id,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

impl Entity for ListRow {
    type Id = ListId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

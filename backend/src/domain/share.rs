//! Sharing
//!
//! A grant lets a non-owner view and act on a list until it is revoked.

use serde::{Deserialize, Serialize};

use super::ids::{ListId, UserId};

/// A row of the `shared_lists` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShareGrant {
    pub list_id: ListId,
    pub shared_with: UserId,
}

impl ShareGrant {
    pub fn new(list_id: ListId, shared_with: UserId) -> Self {
        Self { list_id, shared_with }
    }
}

/// A grantee as reported by the `list_grantees` procedure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grantee {
    pub user_id: UserId,
    pub email: String,
}

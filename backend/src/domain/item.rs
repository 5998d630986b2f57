//! Item Entity
//!
//! Represents a todo entry inside a list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{DomainError, DomainResult, Entity};
use super::ids::{ItemId, ListId};

/// A row of the `list_items` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: ItemId,
    /// Parent list
    pub list_id: ListId,
    pub content: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl ItemRow {
    /// Create a new, not yet completed item
    pub fn new(list_id: ListId, content: String) -> Self {
        Self {
            id: ItemId::new(),
            list_id,
            content,
            completed: false,
            created_at: Utc::now(),
        }
    }

    /// Apply a patch in place
    pub fn apply(&mut self, patch: &ItemPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

impl Entity for ItemRow {
    type Id = ItemId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Partial update of the mutable item columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl ItemPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            content: None,
            completed: Some(completed),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.completed.is_none()
    }

    /// Reject patches that would not change anything
    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::InvalidInput("empty item update".into()));
        }
        Ok(())
    }
}

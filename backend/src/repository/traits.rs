//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces of the backend collaborator.
//! The client store only ever talks to these traits; the embedded SQLite
//! implementation lives next door and a hosted service could replace it.
//!
//! Authorization is the implementation's job: every method runs on behalf
//! of the identity the backend session is bound to.

use async_trait::async_trait;

use crate::domain::{
    DomainResult, Grantee, ItemId, ItemPatch, ItemRow, ListId, ListRow, ShareGrant, UserId,
};

/// Identity retrieval
#[async_trait]
pub trait AuthOperations: Send + Sync {
    /// The authenticated identity of this session, if any
    async fn current_identity(&self) -> DomainResult<Option<UserId>>;
}

/// Operations on the `lists` table
#[async_trait]
pub trait ListOperations: Send + Sync {
    /// Ids of the lists granted to `user_id`
    async fn granted_list_ids(&self, user_id: UserId) -> DomainResult<Vec<ListId>>;

    /// Lists created by `user_id`, newest first
    async fn owned_lists(&self, user_id: UserId) -> DomainResult<Vec<ListRow>>;

    /// Visible lists among `ids`, newest first
    async fn lists_by_ids(&self, ids: &[ListId]) -> DomainResult<Vec<ListRow>>;

    /// Insert a list owned by `user_id` and return the stored row
    async fn insert_list(&self, title: &str, user_id: UserId) -> DomainResult<ListRow>;

    /// Rename a list and return the stored row
    async fn update_list_title(&self, id: ListId, title: &str) -> DomainResult<ListRow>;

    /// Delete a list together with its items and grants
    async fn delete_list(&self, id: ListId) -> DomainResult<()>;
}

/// Operations on the `list_items` table
#[async_trait]
pub trait ItemOperations: Send + Sync {
    /// Items of a list, oldest first
    async fn items_for_list(&self, list_id: ListId) -> DomainResult<Vec<ItemRow>>;

    /// Insert a new, not yet completed item and return the stored row
    async fn insert_item(&self, list_id: ListId, content: &str) -> DomainResult<ItemRow>;

    /// Apply a patch and return the stored row
    async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> DomainResult<ItemRow>;

    async fn delete_item(&self, id: ItemId) -> DomainResult<()>;

    /// Delete every completed item of a list, returning how many went away
    async fn delete_completed_items(&self, list_id: ListId) -> DomainResult<u64>;
}

/// Operations on the `shared_lists` table and the sharing procedures
#[async_trait]
pub trait ShareOperations: Send + Sync {
    async fn insert_grant(&self, grant: &ShareGrant) -> DomainResult<()>;

    async fn delete_grant(&self, list_id: ListId, user_id: UserId) -> DomainResult<()>;

    /// Remote procedure: look up an account by email
    async fn resolve_identity_by_email(&self, email: &str) -> DomainResult<Option<UserId>>;

    /// Remote procedure: everyone a list is shared with
    async fn list_grantees(&self, list_id: ListId) -> DomainResult<Vec<Grantee>>;
}

/// The complete backend contract
pub trait Backend: AuthOperations + ListOperations + ItemOperations + ShareOperations {}

impl<T> Backend for T where T: AuthOperations + ListOperations + ItemOperations + ShareOperations {}

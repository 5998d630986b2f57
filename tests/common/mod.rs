//! Shared fixtures for store tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use checkmate::backend::{
    init_db, AuthOperations, DbState, DomainError, DomainResult, Grantee, ItemId, ItemOperations,
    ItemPatch, ItemRow, ListId, ListOperations, ListRow, ShareGrant, ShareOperations,
    SqliteBackend, UserId,
};
use checkmate::ListStore;

pub async fn setup_db() -> DbState {
    init_db(&PathBuf::from(":memory:"))
        .await
        .expect("Failed to init test DB")
}

/// A registered user and a store signed in as them
pub async fn user_store(db: &DbState, email: &str) -> (UserId, ListStore) {
    let user_id = db.register_user(email).await.expect("register");
    (user_id, ListStore::new(Arc::new(db.session(user_id))))
}

/// Wraps a real session and fails or stalls chosen operations
pub struct FlakyBackend {
    inner: SqliteBackend,
    failing: Mutex<HashSet<&'static str>>,
    gate: Mutex<Option<(&'static str, Arc<Notify>)>>,
}

impl FlakyBackend {
    pub fn new(inner: SqliteBackend) -> Self {
        Self {
            inner,
            failing: Mutex::new(HashSet::new()),
            gate: Mutex::new(None),
        }
    }

    /// Make `op` fail with an internal error until `heal` is called
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn heal(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    /// Make `op` wait until the returned notifier fires
    pub fn stall(&self, op: &'static str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((op, notify.clone()));
        notify
    }

    async fn enter(&self, op: &'static str) -> DomainResult<()> {
        let gate = self
            .gate
            .lock()
            .unwrap()
            .as_ref()
            .filter(|(name, _)| *name == op)
            .map(|(_, notify)| notify.clone());
        if let Some(notify) = gate {
            notify.notified().await;
        }
        if self.failing.lock().unwrap().contains(op) {
            return Err(DomainError::Internal(format!("{} unavailable", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthOperations for FlakyBackend {
    async fn current_identity(&self) -> DomainResult<Option<UserId>> {
        self.enter("current_identity").await?;
        self.inner.current_identity().await
    }
}

#[async_trait]
impl ListOperations for FlakyBackend {
    async fn granted_list_ids(&self, user_id: UserId) -> DomainResult<Vec<ListId>> {
        self.enter("granted_list_ids").await?;
        self.inner.granted_list_ids(user_id).await
    }

    async fn owned_lists(&self, user_id: UserId) -> DomainResult<Vec<ListRow>> {
        self.enter("owned_lists").await?;
        self.inner.owned_lists(user_id).await
    }

    async fn lists_by_ids(&self, ids: &[ListId]) -> DomainResult<Vec<ListRow>> {
        self.enter("lists_by_ids").await?;
        self.inner.lists_by_ids(ids).await
    }

    async fn insert_list(&self, title: &str, user_id: UserId) -> DomainResult<ListRow> {
        self.enter("insert_list").await?;
        self.inner.insert_list(title, user_id).await
    }

    async fn update_list_title(&self, id: ListId, title: &str) -> DomainResult<ListRow> {
        self.enter("update_list_title").await?;
        self.inner.update_list_title(id, title).await
    }

    async fn delete_list(&self, id: ListId) -> DomainResult<()> {
        self.enter("delete_list").await?;
        self.inner.delete_list(id).await
    }
}

#[async_trait]
impl ItemOperations for FlakyBackend {
    async fn items_for_list(&self, list_id: ListId) -> DomainResult<Vec<ItemRow>> {
        self.enter("items_for_list").await?;
        self.inner.items_for_list(list_id).await
    }

    async fn insert_item(&self, list_id: ListId, content: &str) -> DomainResult<ItemRow> {
        self.enter("insert_item").await?;
        self.inner.insert_item(list_id, content).await
    }

    async fn update_item(&self, id: ItemId, patch: &ItemPatch) -> DomainResult<ItemRow> {
        self.enter("update_item").await?;
        self.inner.update_item(id, patch).await
    }

    async fn delete_item(&self, id: ItemId) -> DomainResult<()> {
        self.enter("delete_item").await?;
        self.inner.delete_item(id).await
    }

    async fn delete_completed_items(&self, list_id: ListId) -> DomainResult<u64> {
        self.enter("delete_completed_items").await?;
        self.inner.delete_completed_items(list_id).await
    }
}

#[async_trait]
impl ShareOperations for FlakyBackend {
    async fn insert_grant(&self, grant: &ShareGrant) -> DomainResult<()> {
        self.enter("insert_grant").await?;
        self.inner.insert_grant(grant).await
    }

    async fn delete_grant(&self, list_id: ListId, user_id: UserId) -> DomainResult<()> {
        self.enter("delete_grant").await?;
        self.inner.delete_grant(list_id, user_id).await
    }

    async fn resolve_identity_by_email(&self, email: &str) -> DomainResult<Option<UserId>> {
        self.enter("resolve_identity_by_email").await?;
        self.inner.resolve_identity_by_email(email).await
    }

    async fn list_grantees(&self, list_id: ListId) -> DomainResult<Vec<Grantee>> {
        self.enter("list_grantees").await?;
        self.inner.list_grantees(list_id).await
    }
}

/// A store over a `FlakyBackend` for a freshly registered user
pub async fn flaky_store(db: &DbState, email: &str) -> (UserId, Arc<FlakyBackend>, ListStore) {
    let user_id = db.register_user(email).await.expect("register");
    let backend = Arc::new(FlakyBackend::new(db.session(user_id)));
    let store = ListStore::new(backend.clone());
    (user_id, backend, store)
}

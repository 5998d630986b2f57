//! List Store
//!
//! Client-side cache of the current identity's lists, their items and
//! sharing metadata. Every mutation goes through the backend:
//!
//! 1. patch the cache optimistically,
//! 2. perform the backend call(s),
//! 3. reconcile with the canonical rows the backend returns (or refetch),
//! 4. on failure roll back only the keys this operation touched.
//!
//! `items` and `shared_users` are filled lazily: a missing key means "not
//! fetched yet", never "empty".
//!
//! An optimistic patch is undone when the backend rejects it and also when
//! the operation future is dropped before the backend answered, so the cache
//! never keeps a change the backend did not confirm.
//!
//! Status is shared by all operations. Starting one clears `error`;
//! `loading` stays set while any operation is in flight, and the last
//! failure to be recorded is the one shown.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use checkmate_backend::{Backend, DomainError, ListId, ListRow, ShareGrant, UserId};

use crate::models::{position, sort_lists, ItemId, ItemUpdate, List, ListItem, SharedUser};

/// Result type of store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No identity could be resolved
    #[error("User not authenticated")]
    Authentication,
    /// A backend query, insert, update or delete failed
    #[error("{0}")]
    Backend(String),
    /// Email resolution found nobody
    #[error("{0}")]
    NotFound(String),
    /// Rejected before reaching the store
    #[error("{0}")]
    Validation(String),
}

/// Blank text never reaches the backend
fn require_text(field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Unauthenticated => StoreError::Authentication,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Snapshot of everything the store holds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// Owned and shared lists, newest first
    pub lists: Vec<List>,
    /// Items per list, oldest first
    pub items: HashMap<ListId, Vec<ListItem>>,
    /// Grantees per list
    pub shared_users: HashMap<ListId, Vec<SharedUser>>,
    pub loading: bool,
    /// Message of the last failed operation
    pub error: Option<String>,
}

#[derive(Default)]
struct Inner {
    state: StoreState,
    /// Which cached list holds an item
    item_index: HashMap<ItemId, ListId>,
    in_flight: usize,
}

/// What evicting a list removed, for rollback
struct Evicted {
    list: Option<(usize, List)>,
    items: Option<Vec<ListItem>>,
    shared_users: Option<Vec<SharedUser>>,
}

impl Inner {
    /// Replace a list's items, returning the previous entry
    fn set_items(&mut self, list_id: ListId, items: Vec<ListItem>) -> Option<Vec<ListItem>> {
        for item in &items {
            self.item_index.insert(item.id, list_id);
        }
        let previous = self.state.items.insert(list_id, items);
        self.unindex_stale(list_id, previous.as_deref());
        previous
    }

    fn remove_items(&mut self, list_id: ListId) -> Option<Vec<ListItem>> {
        let previous = self.state.items.remove(&list_id);
        self.unindex_stale(list_id, previous.as_deref());
        previous
    }

    /// Drop index entries of `old` items that are no longer cached under `list_id`
    fn unindex_stale(&mut self, list_id: ListId, old: Option<&[ListItem]>) {
        let current = self.state.items.get(&list_id);
        for item in old.unwrap_or_default() {
            let still_cached = current.is_some_and(|items| items.iter().any(|i| i.id == item.id));
            if !still_cached && self.item_index.get(&item.id) == Some(&list_id) {
                self.item_index.remove(&item.id);
            }
        }
    }

    /// Insert or replace an item in its list, keeping creation order.
    /// Lists that were never fetched stay unfetched.
    fn upsert_item(&mut self, item: ListItem) -> bool {
        let Some(items) = self.state.items.get_mut(&item.list_id) else {
            return false;
        };
        self.item_index.insert(item.id, item.list_id);
        match position(items.as_slice(), item.id) {
            Some(at) => items[at] = item,
            None => {
                let at = items.partition_point(|i| i.created_at <= item.created_at);
                items.insert(at, item);
            }
        }
        true
    }

    fn remove_item(&mut self, list_id: ListId, item_id: ItemId) -> Option<ListItem> {
        let items = self.state.items.get_mut(&list_id)?;
        let at = position(items.as_slice(), item_id)?;
        self.item_index.remove(&item_id);
        Some(items.remove(at))
    }

    /// Patch a cached item in place, returning its previous value
    fn patch_item(&mut self, item_id: ItemId, update: &ItemUpdate) -> Option<ListItem> {
        let list_id = *self.item_index.get(&item_id)?;
        let item = self
            .state
            .items
            .get_mut(&list_id)?
            .iter_mut()
            .find(|i| i.id == item_id)?;
        let previous = item.clone();
        item.apply(update);
        Some(previous)
    }

    fn evict_list(&mut self, list_id: ListId) -> Evicted {
        let at = position(&self.state.lists, list_id);
        let list = at.map(|at| (at, self.state.lists.remove(at)));
        // Deleted lists keep an empty item entry
        let items = self.set_items(list_id, Vec::new());
        let shared_users = self.state.shared_users.remove(&list_id);
        Evicted { list, items, shared_users }
    }

    fn restore_list(&mut self, list_id: ListId, evicted: Evicted) {
        if let Some((at, list)) = evicted.list {
            if position(&self.state.lists, list_id).is_none() {
                let at = at.min(self.state.lists.len());
                self.state.lists.insert(at, list);
            }
        }
        match evicted.items {
            Some(items) => {
                self.set_items(list_id, items);
            }
            None => {
                self.remove_items(list_id);
            }
        }
        if let Some(users) = evicted.shared_users {
            self.state.shared_users.entry(list_id).or_insert(users);
        }
    }
}

/// Marks one operation as in flight; dropping it (including when the
/// operation future is cancelled) releases the shared loading status.
struct Operation<'a> {
    store: &'a ListStore,
    name: &'static str,
}

impl Operation<'_> {
    /// Record a failure into the shared status and hand the result back
    fn finish<T>(self, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(err) = &result {
            log::warn!("{} failed: {}", self.name, err);
            self.store.lock().state.error = Some(err.to_string());
        } else {
            log::debug!("{} done", self.name);
        }
        result
    }
}

impl Drop for Operation<'_> {
    fn drop(&mut self) {
        let mut inner = self.store.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        inner.state.loading = inner.in_flight > 0;
    }
}

type Undo = Box<dyn FnOnce(&mut Inner) + Send>;

/// Pending undo of an optimistic patch. Runs when dropped unless the
/// backend confirmed the change first.
struct Rollback<'a> {
    store: &'a ListStore,
    undo: Option<Undo>,
}

impl Rollback<'_> {
    /// The backend accepted the change; keep the patch
    fn confirm(mut self) {
        self.undo = None;
    }
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if let Some(undo) = self.undo.take() {
            let mut inner = self.store.lock();
            undo(&mut *inner);
        }
    }
}

/// The list/item store
pub struct ListStore {
    backend: Arc<dyn Backend>,
    inner: Mutex<Inner>,
}

impl ListStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State is patched in small synchronous steps, so a panic elsewhere
        // can't leave it half-written
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    fn rollback(&self, undo: impl FnOnce(&mut Inner) + Send + 'static) -> Rollback<'_> {
        Rollback {
            store: self,
            undo: Some(Box::new(undo)),
        }
    }

    fn begin(&self, name: &'static str) -> Operation<'_> {
        let mut inner = self.lock();
        inner.in_flight += 1;
        inner.state.loading = true;
        inner.state.error = None;
        log::debug!("{} started", name);
        Operation { store: self, name }
    }

    // ========================
    // Accessors
    // ========================

    pub fn snapshot(&self) -> StoreState {
        self.lock().state.clone()
    }

    pub fn lists(&self) -> Vec<List> {
        self.lock().state.lists.clone()
    }

    pub fn list(&self, list_id: ListId) -> Option<List> {
        self.lock().state.lists.iter().find(|l| l.id == list_id).cloned()
    }

    /// Cached items of a list; `None` if never fetched
    pub fn items(&self, list_id: ListId) -> Option<Vec<ListItem>> {
        self.lock().state.items.get(&list_id).cloned()
    }

    /// Cached grantees of a list; `None` if never fetched
    pub fn shared_users(&self, list_id: ListId) -> Option<Vec<SharedUser>> {
        self.lock().state.shared_users.get(&list_id).cloned()
    }

    /// The cached list currently holding an item
    pub fn list_of_item(&self, item_id: ItemId) -> Option<ListId> {
        self.lock().item_index.get(&item_id).copied()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().state.error.clone()
    }

    async fn require_identity(&self) -> StoreResult<UserId> {
        self.backend
            .current_identity()
            .await?
            .ok_or(StoreError::Authentication)
    }

    // ========================
    // Lists
    // ========================

    /// Reload owned and shared lists, replacing the cached sequence
    pub async fn fetch_lists(&self) -> StoreResult<()> {
        let op = self.begin("fetch_lists");
        op.finish(self.load_lists().await)
    }

    async fn load_lists(&self) -> StoreResult<()> {
        let user_id = self.require_identity().await?;

        let granted = self.backend.granted_list_ids(user_id).await?;
        let owned = self.backend.owned_lists(user_id).await?;
        let shared = if granted.is_empty() {
            Vec::new()
        } else {
            self.backend.lists_by_ids(&granted).await?
        };

        let mut lists: Vec<List> = owned.into_iter().map(List::owned).collect();
        for row in shared {
            // Never report a list as both owned and shared
            if !row.is_owned_by(user_id) && position(&lists, row.id).is_none() {
                lists.push(List::shared(row));
            }
        }
        sort_lists(&mut lists);

        log::debug!("Loaded {} lists for {}", lists.len(), user_id);
        self.with(|inner| inner.state.lists = lists);
        Ok(())
    }

    /// Create a list owned by the current identity
    ///
    /// A provisional entry is shown right away; the lists are then
    /// refetched so the cache holds the backend's rows.
    pub async fn create_list(&self, title: &str) -> StoreResult<List> {
        let op = self.begin("create_list");
        op.finish(self.create_list_inner(title).await)
    }

    async fn create_list_inner(&self, title: &str) -> StoreResult<List> {
        require_text("title", title)?;
        let user_id = self.require_identity().await?;

        let provisional = List::owned(ListRow::new(title.to_string(), user_id));
        let local_id = provisional.id;
        self.with(|inner| inner.state.lists.insert(0, provisional));
        let rollback = self.rollback(move |inner| inner.state.lists.retain(|l| l.id != local_id));

        let row = self.backend.insert_list(title, user_id).await?;
        rollback.confirm();

        let created = List::owned(row.clone());
        self.with(|inner| {
            if let Some(list) = inner.state.lists.iter_mut().find(|l| l.id == local_id) {
                list.refresh(row);
            }
            sort_lists(&mut inner.state.lists);
        });

        self.load_lists().await?;
        Ok(created)
    }

    /// Rename a list
    pub async fn update_list(&self, list_id: ListId, title: &str) -> StoreResult<()> {
        let op = self.begin("update_list");
        op.finish(self.update_list_inner(list_id, title).await)
    }

    async fn update_list_inner(&self, list_id: ListId, title: &str) -> StoreResult<()> {
        require_text("title", title)?;
        let previous = self.with(|inner| {
            inner
                .state
                .lists
                .iter_mut()
                .find(|l| l.id == list_id)
                .map(|l| std::mem::replace(&mut l.title, title.to_string()))
        });

        let patched = title.to_string();
        let rollback = self.rollback(move |inner| {
            let Some(old) = previous else {
                return;
            };
            // Leave it alone if someone renamed it again meanwhile
            if let Some(list) = inner
                .state
                .lists
                .iter_mut()
                .find(|l| l.id == list_id && l.title == patched)
            {
                list.title = old;
            }
        });

        let row = self.backend.update_list_title(list_id, title).await?;
        rollback.confirm();
        self.with(|inner| {
            if let Some(list) = inner.state.lists.iter_mut().find(|l| l.id == list_id) {
                list.refresh(row);
            }
        });
        Ok(())
    }

    /// Delete a list; its item entry becomes empty
    pub async fn delete_list(&self, list_id: ListId) -> StoreResult<()> {
        let op = self.begin("delete_list");
        op.finish(self.delete_list_inner(list_id).await)
    }

    async fn delete_list_inner(&self, list_id: ListId) -> StoreResult<()> {
        let evicted = self.with(|inner| inner.evict_list(list_id));
        let rollback = self.rollback(move |inner| inner.restore_list(list_id, evicted));

        self.backend.delete_list(list_id).await?;
        rollback.confirm();
        Ok(())
    }

    // ========================
    // Items
    // ========================

    /// Replace a list's cached items with the backend's
    pub async fn fetch_items(&self, list_id: ListId) -> StoreResult<()> {
        let op = self.begin("fetch_items");
        op.finish(self.load_items(list_id).await)
    }

    async fn load_items(&self, list_id: ListId) -> StoreResult<()> {
        let items = self.backend.items_for_list(list_id).await?;
        self.with(|inner| inner.set_items(list_id, items));
        Ok(())
    }

    /// Add an item to a list, then refetch that list's items
    pub async fn create_item(&self, list_id: ListId, content: &str) -> StoreResult<ListItem> {
        let op = self.begin("create_item");
        op.finish(self.create_item_inner(list_id, content).await)
    }

    async fn create_item_inner(&self, list_id: ListId, content: &str) -> StoreResult<ListItem> {
        require_text("content", content)?;
        let provisional = ListItem::new(list_id, content.to_string());
        let local_id = provisional.id;
        // Only shown when the list's items are already cached
        self.with(|inner| inner.upsert_item(provisional));
        let rollback = self.rollback(move |inner| {
            inner.remove_item(list_id, local_id);
        });

        let row = self.backend.insert_item(list_id, content).await?;
        rollback.confirm();

        self.with(|inner| {
            if inner.remove_item(list_id, local_id).is_some() {
                inner.upsert_item(row.clone());
            }
        });

        self.load_items(list_id).await?;
        Ok(row)
    }

    /// Update content and/or completion of an item
    ///
    /// The cached copy is located through the item index and reconciled
    /// with the row the backend returns, so it is patched whenever its
    /// list is cached.
    pub async fn update_item(&self, item_id: ItemId, update: ItemUpdate) -> StoreResult<ListItem> {
        let op = self.begin("update_item");
        op.finish(self.update_item_inner(item_id, update).await)
    }

    async fn update_item_inner(&self, item_id: ItemId, update: ItemUpdate) -> StoreResult<ListItem> {
        if update.is_empty() {
            return Err(StoreError::Validation("nothing to update".into()));
        }
        if let Some(content) = &update.content {
            require_text("content", content)?;
        }
        let previous = self.with(|inner| inner.patch_item(item_id, &update));

        let rollback = self.rollback(move |inner| {
            if let Some(old) = previous {
                inner.upsert_item(old);
            }
        });

        let row = self.backend.update_item(item_id, &update).await?;
        rollback.confirm();
        self.with(|inner| {
            // The item may have been cached under another list
            if let Some(old_list) = inner.item_index.get(&item_id).copied() {
                if old_list != row.list_id {
                    inner.remove_item(old_list, item_id);
                }
            }
            inner.upsert_item(row.clone());
        });
        Ok(row)
    }

    /// Delete one item of a list
    pub async fn delete_item(&self, item_id: ItemId, list_id: ListId) -> StoreResult<()> {
        let op = self.begin("delete_item");
        op.finish(self.delete_item_inner(item_id, list_id).await)
    }

    async fn delete_item_inner(&self, item_id: ItemId, list_id: ListId) -> StoreResult<()> {
        let removed = self.with(|inner| inner.remove_item(list_id, item_id));
        let rollback = self.rollback(move |inner| {
            if let Some(item) = removed {
                inner.upsert_item(item);
            }
        });

        self.backend.delete_item(item_id).await?;
        rollback.confirm();
        Ok(())
    }

    /// Delete every completed item of a list, returning how many the
    /// backend removed
    pub async fn clear_completed_items(&self, list_id: ListId) -> StoreResult<u64> {
        let op = self.begin("clear_completed_items");
        op.finish(self.clear_completed_inner(list_id).await)
    }

    async fn clear_completed_inner(&self, list_id: ListId) -> StoreResult<u64> {
        let removed: Vec<ListItem> = self.with(|inner| {
            let Some(items) = inner.state.items.get(&list_id) else {
                return Vec::new();
            };
            let (done, kept): (Vec<_>, Vec<_>) = items.iter().cloned().partition(|i| i.completed);
            if !done.is_empty() {
                inner.set_items(list_id, kept);
            }
            done
        });

        let rollback = self.rollback(move |inner| {
            for item in removed {
                inner.upsert_item(item);
            }
        });

        let count = self.backend.delete_completed_items(list_id).await?;
        rollback.confirm();
        Ok(count)
    }

    // ========================
    // Sharing
    // ========================

    /// Share a list with the account registered under `email`
    ///
    /// Unlike the other operations, callers are expected to act on the
    /// returned error (e.g. "no such user").
    pub async fn share_list(&self, list_id: ListId, email: &str) -> StoreResult<()> {
        let op = self.begin("share_list");
        op.finish(self.share_list_inner(list_id, email).await)
    }

    async fn share_list_inner(&self, list_id: ListId, email: &str) -> StoreResult<()> {
        let user_id = match self.backend.resolve_identity_by_email(email).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => {
                return Err(StoreError::NotFound(format!("User not found: {}", email.trim())))
            }
            Err(DomainError::Unauthenticated) => return Err(StoreError::Authentication),
            Err(e) => {
                log::debug!("resolve_identity_by_email failed: {}", e);
                return Err(StoreError::Backend("Failed to find user".into()));
            }
        };

        let added = self.with(|inner| {
            let Some(users) = inner.state.shared_users.get_mut(&list_id) else {
                return false;
            };
            if users.iter().any(|u| u.user_id == user_id) {
                return false;
            }
            users.push(SharedUser {
                user_id,
                email: email.trim().to_lowercase(),
            });
            true
        });

        let rollback = self.rollback(move |inner| {
            if !added {
                return;
            }
            if let Some(users) = inner.state.shared_users.get_mut(&list_id) {
                users.retain(|u| u.user_id != user_id);
            }
        });

        self.backend.insert_grant(&ShareGrant::new(list_id, user_id)).await?;
        rollback.confirm();

        self.load_shared_users(list_id).await
    }

    /// Revoke a grant, then refetch the list's grantees
    pub async fn unshare_list(&self, list_id: ListId, user_id: UserId) -> StoreResult<()> {
        let op = self.begin("unshare_list");
        op.finish(self.unshare_list_inner(list_id, user_id).await)
    }

    async fn unshare_list_inner(&self, list_id: ListId, user_id: UserId) -> StoreResult<()> {
        let removed = self.with(|inner| {
            let users = inner.state.shared_users.get_mut(&list_id)?;
            let at = users.iter().position(|u| u.user_id == user_id)?;
            Some((at, users.remove(at)))
        });

        let rollback = self.rollback(move |inner| {
            let Some((at, user)) = removed else {
                return;
            };
            if let Some(users) = inner.state.shared_users.get_mut(&list_id) {
                if !users.iter().any(|u| u.user_id == user.user_id) {
                    let at = at.min(users.len());
                    users.insert(at, user);
                }
            }
        });

        self.backend.delete_grant(list_id, user_id).await?;
        rollback.confirm();

        self.load_shared_users(list_id).await
    }

    /// Replace a list's cached grantees with the backend's
    pub async fn fetch_shared_users(&self, list_id: ListId) -> StoreResult<()> {
        let op = self.begin("fetch_shared_users");
        op.finish(self.load_shared_users(list_id).await)
    }

    async fn load_shared_users(&self, list_id: ListId) -> StoreResult<()> {
        let users: Vec<SharedUser> = self
            .backend
            .list_grantees(list_id)
            .await?
            .into_iter()
            .map(SharedUser::from)
            .collect();
        self.with(|inner| inner.state.shared_users.insert(list_id, users));
        Ok(())
    }

    /// Leave a list shared with the current identity
    pub async fn remove_self_from_list(&self, list_id: ListId) -> StoreResult<()> {
        let op = self.begin("remove_self_from_list");
        op.finish(self.remove_self_inner(list_id).await)
    }

    async fn remove_self_inner(&self, list_id: ListId) -> StoreResult<()> {
        let user_id = self.require_identity().await?;
        let evicted = self.with(|inner| inner.evict_list(list_id));
        let rollback = self.rollback(move |inner| inner.restore_list(list_id, evicted));

        self.backend.delete_grant(list_id, user_id).await?;
        rollback.confirm();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(list_id: ListId, content: &str, minutes_ago: i64) -> ListItem {
        let mut item = ListItem::new(list_id, content.to_string());
        item.created_at = item.created_at - Duration::minutes(minutes_ago);
        item
    }

    #[test]
    fn test_set_items_reindexes() {
        let mut inner = Inner::default();
        let list_id = ListId::new();
        let milk = item(list_id, "milk", 2);
        let eggs = item(list_id, "eggs", 1);

        inner.set_items(list_id, vec![milk.clone(), eggs.clone()]);
        assert_eq!(inner.item_index.get(&milk.id), Some(&list_id));

        let previous = inner.set_items(list_id, vec![eggs.clone()]);
        assert_eq!(previous.map(|items| items.len()), Some(2));
        assert_eq!(inner.item_index.get(&milk.id), None);
        assert_eq!(inner.item_index.get(&eggs.id), Some(&list_id));

        inner.remove_items(list_id);
        assert!(inner.item_index.is_empty());
        assert!(!inner.state.items.contains_key(&list_id));
    }

    #[test]
    fn test_upsert_keeps_creation_order() {
        let mut inner = Inner::default();
        let list_id = ListId::new();
        let oldest = item(list_id, "oldest", 3);
        let middle = item(list_id, "middle", 2);
        let newest = item(list_id, "newest", 1);

        assert!(!inner.upsert_item(middle.clone()));
        assert!(inner.item_index.is_empty());

        inner.set_items(list_id, vec![oldest.clone(), newest.clone()]);
        assert!(inner.upsert_item(middle.clone()));
        let order: Vec<_> = inner.state.items[&list_id].iter().map(|i| i.id).collect();
        assert_eq!(order, vec![oldest.id, middle.id, newest.id]);

        let mut renamed = middle.clone();
        renamed.content = "renamed".into();
        inner.upsert_item(renamed);
        assert_eq!(inner.state.items[&list_id].len(), 3);
        assert_eq!(inner.state.items[&list_id][1].content, "renamed");
    }

    #[test]
    fn test_patch_item_returns_previous() {
        let mut inner = Inner::default();
        let list_id = ListId::new();
        let milk = item(list_id, "milk", 1);
        inner.set_items(list_id, vec![milk.clone()]);

        let previous = inner.patch_item(milk.id, &ItemUpdate::completed(true));
        assert_eq!(previous, Some(milk.clone()));
        assert!(inner.state.items[&list_id][0].completed);

        assert_eq!(inner.patch_item(ItemId::new(), &ItemUpdate::completed(true)), None);
    }

    #[test]
    fn test_evict_and_restore_list() {
        let mut inner = Inner::default();
        let owner = UserId::new();
        let first = List::owned(ListRow::new("first".into(), owner));
        let second = List::owned(ListRow::new("second".into(), owner));
        let milk = item(second.id, "milk", 1);
        inner.state.lists = vec![first.clone(), second.clone()];
        inner.set_items(second.id, vec![milk.clone()]);
        inner.state.shared_users.insert(second.id, Vec::new());
        let before = inner.state.clone();

        let evicted = inner.evict_list(second.id);
        assert_eq!(inner.state.lists, vec![first]);
        assert!(inner.state.items[&second.id].is_empty());
        assert!(!inner.state.shared_users.contains_key(&second.id));
        assert_eq!(inner.item_index.get(&milk.id), None);

        inner.restore_list(second.id, evicted);
        assert_eq!(inner.state, before);
        assert_eq!(inner.item_index.get(&milk.id), Some(&second.id));
    }

    #[test]
    fn test_restore_of_unfetched_items() {
        let mut inner = Inner::default();
        let list_id = ListId::new();

        let evicted = inner.evict_list(list_id);
        assert_eq!(inner.state.items.get(&list_id), Some(&Vec::new()));
        inner.restore_list(list_id, evicted);
        assert_eq!(inner.state.items.get(&list_id), None);
    }

    fn detached_store() -> ListStore {
        ListStore::new(Arc::new(checkmate_backend::DbState::new().anonymous()))
    }

    #[test]
    fn test_rollback_runs_when_dropped() {
        let store = detached_store();
        let list = List::owned(ListRow::new("provisional".into(), UserId::new()));
        let local_id = list.id;
        store.with(|inner| inner.state.lists.push(list));

        let rollback = store.rollback(move |inner| inner.state.lists.retain(|l| l.id != local_id));
        drop(rollback);
        assert!(store.lists().is_empty());
    }

    #[test]
    fn test_confirmed_rollback_keeps_patch() {
        let store = detached_store();
        let list = List::owned(ListRow::new("confirmed".into(), UserId::new()));
        let local_id = list.id;
        store.with(|inner| inner.state.lists.push(list));

        store
            .rollback(move |inner| inner.state.lists.retain(|l| l.id != local_id))
            .confirm();
        assert_eq!(store.lists().len(), 1);
    }

    #[test]
    fn test_domain_error_mapping() {
        assert_eq!(StoreError::from(DomainError::Unauthenticated), StoreError::Authentication);
        assert_eq!(
            StoreError::from(DomainError::Forbidden("no".into())),
            StoreError::Backend(DomainError::Forbidden("no".into()).to_string())
        );
    }
}

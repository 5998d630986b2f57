//! Application Context
//!
//! Owns everything a presentation layer needs for one signed-in session:
//! the list store (with its injected backend), the theme preference and
//! the active identity. Pass it around explicitly; there is no global.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use checkmate_backend::{init_db, Backend, DbState, DomainError, UserId};

use crate::config::AppConfig;
use crate::preferences::{PreferencesError, ThemePreferences};
use crate::store::ListStore;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Backend(#[from] DomainError),
    #[error(transparent)]
    Preferences(#[from] PreferencesError),
}

pub struct AppContext {
    db: Option<DbState>,
    preferences_dir: PathBuf,
    identity: Option<UserId>,
    store: Arc<ListStore>,
    theme: ThemePreferences,
}

impl AppContext {
    /// Build a context around an existing backend session
    pub fn new(backend: Arc<dyn Backend>, identity: Option<UserId>, preferences_dir: PathBuf) -> Self {
        let theme = ThemePreferences::load(&preferences_dir, identity);
        Self {
            db: None,
            preferences_dir,
            identity,
            store: Arc::new(ListStore::new(backend)),
            theme,
        }
    }

    /// Open the configured database and sign in as `email` (registering the
    /// account on first use); `None` opens a signed-out session
    pub async fn open(config: &AppConfig, email: Option<&str>) -> Result<Self, ContextError> {
        let db = init_db(&config.database_path).await?;
        let mut ctx = Self::new(
            Arc::new(db.anonymous()),
            None,
            config.preferences_dir.clone(),
        );
        ctx.db = Some(db);
        ctx.switch_identity(email).await?;
        Ok(ctx)
    }

    /// Rebind the context to another account. The store is rebuilt, so
    /// nothing cached for the previous identity survives.
    pub async fn switch_identity(&mut self, email: Option<&str>) -> Result<(), ContextError> {
        let db = self
            .db
            .clone()
            .ok_or_else(|| DomainError::Internal("context has no database of its own".into()))?;

        let identity = match email {
            Some(email) => Some(sign_in(&db, email).await?),
            None => None,
        };
        let backend: Arc<dyn Backend> = match identity {
            Some(user_id) => Arc::new(db.session(user_id)),
            None => Arc::new(db.anonymous()),
        };

        log::info!("Switched identity to {:?}", identity);
        self.identity = identity;
        self.store = Arc::new(ListStore::new(backend));
        self.theme = ThemePreferences::load(&self.preferences_dir, identity);
        Ok(())
    }

    /// Sign out; equivalent to switching to no identity
    pub async fn sign_out(&mut self) -> Result<(), ContextError> {
        self.switch_identity(None).await
    }

    pub fn identity(&self) -> Option<UserId> {
        self.identity
    }

    pub fn store(&self) -> Arc<ListStore> {
        Arc::clone(&self.store)
    }

    /// The shared database, when the context opened it itself
    pub fn database(&self) -> Option<&DbState> {
        self.db.as_ref()
    }

    pub fn is_dark(&self) -> bool {
        self.theme.is_dark()
    }

    pub fn toggle_theme(&mut self) -> Result<bool, ContextError> {
        Ok(self.theme.toggle()?)
    }
}

/// Find the account for `email`, registering it on first use
async fn sign_in(db: &DbState, email: &str) -> Result<UserId, DomainError> {
    match db.find_user(email).await? {
        Some(user_id) => Ok(user_id),
        None => db.register_user(email).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            database_path: PathBuf::from(":memory:"),
            preferences_dir: dir.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_open_signs_in() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::open(&memory_config(dir.path()), Some("alice@example.com"))
            .await
            .unwrap();

        let db = ctx.database().unwrap();
        assert_eq!(db.find_user("alice@example.com").await.unwrap(), ctx.identity());
        assert!(ctx.identity().is_some());
    }

    #[tokio::test]
    async fn test_switch_identity_rebuilds_store_and_theme() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = AppContext::open(&memory_config(dir.path()), Some("alice@example.com"))
            .await
            .unwrap();
        let alice = ctx.identity();
        assert!(ctx.toggle_theme().unwrap());

        let store = ctx.store();
        store.create_list("Alice's").await.unwrap();
        assert_eq!(store.lists().len(), 1);

        ctx.switch_identity(Some("bob@example.com")).await.unwrap();
        assert_ne!(ctx.identity(), alice);
        assert!(!ctx.is_dark());
        assert!(ctx.store().lists().is_empty());
        ctx.store().fetch_lists().await.unwrap();
        assert!(ctx.store().lists().is_empty());

        ctx.switch_identity(Some("ALICE@example.com")).await.unwrap();
        assert_eq!(ctx.identity(), alice);
        assert!(ctx.is_dark());
    }

    #[tokio::test]
    async fn test_signed_out_store_reports_authentication() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = AppContext::open(&memory_config(dir.path()), Some("alice@example.com"))
            .await
            .unwrap();
        ctx.sign_out().await.unwrap();

        let store = ctx.store();
        let err = store.fetch_lists().await.unwrap_err();
        assert_eq!(err, crate::store::StoreError::Authentication);
        assert_eq!(store.error().as_deref(), Some("User not authenticated"));
    }
}

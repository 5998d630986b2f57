//! Theme Preferences
//!
//! A per-identity dark/light switch persisted as a small JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use checkmate_backend::UserId;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode theme preference: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ThemeFile {
    #[serde(default)]
    is_dark: bool,
}

/// Theme preference of one identity
#[derive(Debug, Clone)]
pub struct ThemePreferences {
    path: PathBuf,
    theme: ThemeFile,
}

impl ThemePreferences {
    /// Storage file for an identity (`None` = signed out)
    pub fn file_for(dir: &Path, identity: Option<UserId>) -> PathBuf {
        let key = identity.map_or_else(|| "anonymous".to_string(), |id| id.to_string());
        dir.join(format!("theme-storage-{}.json", key))
    }

    /// Load the preference of `identity`; a missing or unreadable file
    /// means the light theme
    pub fn load(dir: &Path, identity: Option<UserId>) -> Self {
        let path = Self::file_for(dir, identity);
        let theme = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring corrupt theme file {}: {}", path.display(), e);
                ThemeFile::default()
            }),
            Err(_) => ThemeFile::default(),
        };
        Self { path, theme }
    }

    pub fn is_dark(&self) -> bool {
        self.theme.is_dark
    }

    /// Flip the theme and persist it, returning the new value
    pub fn toggle(&mut self) -> Result<bool, PreferencesError> {
        self.theme.is_dark = !self.theme.is_dark;
        self.save()?;
        Ok(self.theme.is_dark)
    }

    fn save(&self) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PreferencesError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let raw = serde_json::to_string(&self.theme)?;
        std::fs::write(&self.path, raw).map_err(|source| PreferencesError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_light() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = ThemePreferences::load(dir.path(), Some(UserId::new()));
        assert!(!prefs.is_dark());
    }

    #[test]
    fn test_toggle_persists_per_identity() {
        let dir = tempfile::tempdir().unwrap();
        let alice = UserId::new();
        let bob = UserId::new();

        let mut prefs = ThemePreferences::load(dir.path(), Some(alice));
        assert!(prefs.toggle().unwrap());

        assert!(ThemePreferences::load(dir.path(), Some(alice)).is_dark());
        assert!(!ThemePreferences::load(dir.path(), Some(bob)).is_dark());
        assert!(!ThemePreferences::load(dir.path(), None).is_dark());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_light() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(ThemePreferences::file_for(dir.path(), None), "{not json").unwrap();
        assert!(!ThemePreferences::load(dir.path(), None).is_dark());
    }

    #[test]
    fn test_anonymous_file_name() {
        let path = ThemePreferences::file_for(Path::new("/tmp/prefs"), None);
        assert_eq!(path, Path::new("/tmp/prefs/theme-storage-anonymous.json"));
    }
}

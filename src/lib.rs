//! CheckMate
//!
//! Personal task lists with sharing. The crate is the client side:
//! - models: View types derived from backend rows
//! - store: The list/item store, a cache kept in sync with the backend
//! - commands: Input handling for a presentation layer
//! - context: Per-session wiring (store, identity, theme)
//! - preferences: Per-identity theme preference
//! - config: Application configuration
//!
//! The backend contract and its SQLite implementation live in
//! `checkmate-backend`.

pub mod commands;
pub mod config;
pub mod context;
pub mod models;
pub mod preferences;
pub mod store;

pub use checkmate_backend as backend;
pub use config::{AppConfig, ConfigError};
pub use context::{AppContext, ContextError};
pub use models::{ItemId, ItemUpdate, List, ListItem, SharedUser};
pub use preferences::ThemePreferences;
pub use store::{ListStore, StoreError, StoreResult, StoreState};

/// Install the rolling file logger if the config names a log directory
pub fn init_logging(config: &AppConfig) -> Result<bool, rolling_logger::LoggerError> {
    let Some(dir) = &config.log_dir else {
        return Ok(false);
    };
    rolling_logger::init_logger_with(
        dir,
        "CheckMate",
        config.log_level.parse().unwrap_or(log::LevelFilter::Info),
        rolling_logger::DEFAULT_MAX_BYTES,
        rolling_logger::DEFAULT_MAX_FILES,
    )?;
    log::info!("Logging to {}", dir.display());
    Ok(true)
}

//! Repository Layer
//!
//! Data access abstractions and the embedded SQLite implementation.

mod traits;
mod db;
mod sql;
mod session;
mod list_repo;
mod item_repo;
mod share_repo;


pub use traits::{AuthOperations, Backend, ItemOperations, ListOperations, ShareOperations};
pub use db::{init_db, DbState};
pub use session::SqliteBackend;

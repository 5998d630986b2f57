//! CheckMate Backend
//!
//! The backend collaborator of the list store:
//! - domain: Core entities, ids and errors
//! - repository: The backend contract (async traits) and an embedded
//!   SQLite implementation that enforces row-level authorization

pub mod domain;
pub mod repository;

pub use domain::{
    DomainError, DomainResult, Entity, Grantee, ItemId, ItemPatch, ItemRow, ListId, ListRow,
    ShareGrant, UserId,
};
pub use repository::{
    init_db, AuthOperations, Backend, DbState, ItemOperations, ListOperations, ShareOperations,
    SqliteBackend,
};

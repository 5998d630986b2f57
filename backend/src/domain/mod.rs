//! Domain Layer
//!
//! Contains all domain entities and core abstractions.

mod entity;
mod ids;
mod list;
mod item;
mod share;

pub use entity::{Entity, DomainError, DomainResult};
pub use ids::{ListId, ItemId, UserId};
pub use list::ListRow;
pub use item::{ItemRow, ItemPatch};
pub use share::{ShareGrant, Grantee};

//! UI Commands
//!
//! What a presentation layer calls in response to user input. Inputs are
//! trimmed and blank ones ignored before the store is touched. Store
//! failures are logged and left in the store's `error` for the banner;
//! only sharing hands its error back so the caller can show it in place.

mod list;
mod item;
mod share;

pub use list::*;
pub use item::*;
pub use share::*;

use crate::store::StoreResult;

/// Non-blank trimmed input
fn non_blank(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Keep the error in the store only
fn settle<T>(command: &str, result: StoreResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::debug!("{}: {}", command, e);
            None
        }
    }
}

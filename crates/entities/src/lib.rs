//! Core entity definitions for the todos persistence layer.
//!
//! This crate defines the data model shared by every store backend: lists,
//! the todos they own, and the read-only summary projection returned by
//! list queries.

pub mod completion;
mod list;
mod todo;

pub use list::*;
pub use todo::*;

/// Identifier of a list. Unique within a store.
pub type ListId = i64;

/// Identifier of a todo. Unique within its owning list.
pub type TodoId = i64;

//! Todo list storage.
//!
//! This crate provides the [`TodoStore`] abstraction over lists and their
//! todos, with three interchangeable backends: PostgreSQL (production),
//! SQLite (single-user mode) and a session-backed in-memory store. Relational
//! backends compute list counts with grouping queries; the session backend
//! computes them by iteration.

mod config;
mod error;
mod postgres;
mod session;
mod sqlite;
mod statement;
mod traits;

pub use config::*;
pub use error::*;
pub use postgres::*;
pub use session::*;
pub use sqlite::*;
pub use statement::{DiagnosticsSink, MemorySink, Param, RecordedStatement, Statement, TracingSink};
pub use traits::*;

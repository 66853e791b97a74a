//! Todo entity definitions.

use serde::{Deserialize, Serialize};

use crate::TodoId;

/// A named task with a completion flag, owned by exactly one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Identifier, unique within the owning list.
    pub id: TodoId,
    /// Todo text.
    pub name: String,
    /// Whether the todo is done.
    pub completed: bool,
}

impl Todo {
    /// Creates a new incomplete todo.
    pub fn new(id: TodoId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            completed: false,
        }
    }

    /// Sets the completion flag.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

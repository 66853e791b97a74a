//! List entity definitions.

use serde::{Deserialize, Serialize};

use crate::{ListId, Todo};

/// A named, ordered collection of todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    /// Unique identifier.
    pub id: ListId,
    /// List name.
    pub name: String,
    /// Owned todos, in insertion order.
    #[serde(default)]
    pub todos: Vec<Todo>,
}

impl TodoList {
    /// Creates a new empty list.
    pub fn new(id: ListId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            todos: Vec::new(),
        }
    }

    /// Sets the todos for this list.
    pub fn with_todos(mut self, todos: Vec<Todo>) -> Self {
        self.todos = todos;
        self
    }

    /// Number of todos not yet completed.
    pub fn remaining_count(&self) -> u64 {
        self.todos.iter().filter(|t| !t.completed).count() as u64
    }

    /// True when every todo is completed. Vacuously true for an empty list.
    pub fn is_complete(&self) -> bool {
        self.todos.iter().all(|t| t.completed)
    }

    /// Projects this list into a summary with derived counts.
    pub fn summary(&self) -> ListSummary {
        ListSummary {
            id: self.id,
            name: self.name.clone(),
            todos_count: self.todos.len() as u64,
            todos_remaining_count: self.remaining_count(),
        }
    }
}

/// Read-only projection of a list with aggregate counts instead of todos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    /// List identifier.
    pub id: ListId,
    /// List name.
    pub name: String,
    /// Total number of todos.
    pub todos_count: u64,
    /// Number of todos not yet completed.
    pub todos_remaining_count: u64,
}

impl ListSummary {
    /// True when no todos remain. Vacuously true for an empty list.
    pub fn is_complete(&self) -> bool {
        self.todos_remaining_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_complete() {
        let list = TodoList::new(1, "Groceries");

        assert!(list.is_complete());
        assert!(list.summary().is_complete());
        assert_eq!(list.summary().todos_count, 0);
    }

    #[test]
    fn test_summary_counts() {
        let list = TodoList::new(1, "Groceries").with_todos(vec![
            Todo::new(1, "Milk").with_completed(true),
            Todo::new(2, "Eggs"),
        ]);

        let summary = list.summary();
        assert_eq!(summary.todos_count, 2);
        assert_eq!(summary.todos_remaining_count, 1);
        assert!(!summary.is_complete());
        assert!(!list.is_complete());
    }

    #[test]
    fn test_list_deserializes_without_todos() {
        let list: TodoList = serde_json::from_str(r#"{"id":3,"name":"Chores"}"#).unwrap();

        assert_eq!(list, TodoList::new(3, "Chores"));
    }
}

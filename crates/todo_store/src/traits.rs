//! Todo store trait definitions.

use async_trait::async_trait;
use entities::{ListId, ListSummary, Todo, TodoId, TodoList};

use crate::{TodoStoreError, TodoStoreResult};

/// Trait for todo list storage operations.
///
/// Every backend must behave identically from the caller's point of view.
/// Reads of a missing list return `None` or an empty collection; mutations
/// targeting a missing list or todo fail with [`TodoStoreError::NotFound`].
#[async_trait]
pub trait TodoStore: Send + Sync {
    // =========================================================================
    // List queries
    // =========================================================================

    /// Gets the summary of one list, including derived counts.
    async fn find_list(&self, list_id: ListId) -> TodoStoreResult<Option<ListSummary>>;

    /// Lists all summaries, ordered by name ascending (ties by id).
    async fn all_lists(&self) -> TodoStoreResult<Vec<ListSummary>>;

    /// Returns true if every todo in the list is completed.
    ///
    /// A list without todos is complete.
    async fn list_complete(&self, list_id: ListId) -> TodoStoreResult<bool> {
        self.find_list(list_id)
            .await?
            .map(|summary| summary.is_complete())
            .ok_or_else(|| TodoStoreError::not_found("List", list_id))
    }

    // =========================================================================
    // List mutations
    // =========================================================================

    /// Creates a list with a fresh id and no todos.
    async fn new_list(&self, name: &str) -> TodoStoreResult<()>;

    /// Renames a list.
    async fn rename_list(&self, list_id: ListId, new_name: &str) -> TodoStoreResult<()>;

    /// Deletes a list together with all of its todos.
    async fn delete_list(&self, list_id: ListId) -> TodoStoreResult<()>;

    // =========================================================================
    // Todo operations
    // =========================================================================

    /// Appends an incomplete todo with a fresh list-scoped id.
    async fn add_todo(&self, list_id: ListId, name: &str) -> TodoStoreResult<()>;

    /// Deletes a todo.
    async fn delete_todo(&self, list_id: ListId, todo_id: TodoId) -> TodoStoreResult<()>;

    /// Sets a todo's completion flag.
    async fn set_todo_status(
        &self,
        list_id: ListId,
        todo_id: TodoId,
        completed: bool,
    ) -> TodoStoreResult<()>;

    /// Marks every todo in the list as completed.
    async fn complete_all_todos(&self, list_id: ListId) -> TodoStoreResult<()>;

    /// Lists the todos of a list, ordered by id.
    async fn find_todos_for_list(&self, list_id: ListId) -> TodoStoreResult<Vec<Todo>>;

    // =========================================================================
    // Composite reads and lifecycle
    // =========================================================================

    /// Gets a list with its todos materialized.
    async fn find_list_with_todos(&self, list_id: ListId) -> TodoStoreResult<Option<TodoList>> {
        let Some(summary) = self.find_list(list_id).await? else {
            return Ok(None);
        };
        let todos = self.find_todos_for_list(list_id).await?;
        Ok(Some(TodoList::new(summary.id, summary.name).with_todos(todos)))
    }

    /// Releases any resources held by the store.
    async fn close(&self) {}
}

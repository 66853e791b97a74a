//! Session-backed todo store.
//!
//! Lists live in a [`SessionData`] owned by the hosting request or process
//! layer. The store borrows that context through a [`SharedSession`] handle and
//! computes every aggregate by iterating the nested todo collections.

use std::{
    path::Path,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use entities::{ListId, ListSummary, Todo, TodoId, TodoList};
use serde::{Deserialize, Serialize};

use crate::{TodoStore, TodoStoreError, TodoStoreResult};

/// Mutable per-session state provided by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Lists in insertion order. `None` until a store initializes the slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lists: Option<Vec<TodoList>>,
}

impl SessionData {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a session from a JSON file. A missing file yields an empty session.
    pub fn load(path: &Path) -> TodoStoreResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the session to a JSON file.
    pub fn save(&self, path: &Path) -> TodoStoreResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Shared handle to a session.
pub type SharedSession = Arc<RwLock<SessionData>>;

/// Wraps session data into a shared handle.
pub fn shared_session(data: SessionData) -> SharedSession {
    Arc::new(RwLock::new(data))
}

/// Todo store that keeps lists inside a host-provided session.
///
/// Each call holds the session lock for its whole duration, so id assignment
/// and mutation are atomic with respect to other callers sharing the handle.
#[derive(Debug, Clone)]
pub struct SessionTodoStore {
    session: SharedSession,
}

impl SessionTodoStore {
    /// Creates a store over the given session, initializing its list slot.
    ///
    /// A poisoned session is left untouched; every operation on it then fails
    /// with [`TodoStoreError::Other`].
    pub fn new(session: SharedSession) -> Self {
        if let Ok(mut data) = session.write() {
            data.lists.get_or_insert_with(Vec::new);
        }
        Self { session }
    }

    /// Creates a store over a fresh, private session.
    pub fn in_memory() -> Self {
        Self::new(shared_session(SessionData::new()))
    }

    /// Returns the session handle.
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    fn read(&self) -> TodoStoreResult<RwLockReadGuard<'_, SessionData>> {
        self.session
            .read()
            .map_err(|e| TodoStoreError::Other(format!("Lock poisoned: {}", e)))
    }

    fn write(&self) -> TodoStoreResult<RwLockWriteGuard<'_, SessionData>> {
        self.session
            .write()
            .map_err(|e| TodoStoreError::Other(format!("Lock poisoned: {}", e)))
    }
}

/// Next id for a collection: max existing id + 1, or 1 when empty.
fn next_id(ids: impl Iterator<Item = i64>) -> TodoStoreResult<i64> {
    let max = ids.max().unwrap_or(0);
    max.checked_add(1)
        .ok_or_else(|| TodoStoreError::invalid_data(format!("no id available after {max}")))
}

fn lists(data: &SessionData) -> &[TodoList] {
    data.lists.as_deref().unwrap_or_default()
}

fn lists_mut(data: &mut SessionData) -> &mut Vec<TodoList> {
    data.lists.get_or_insert_with(Vec::new)
}

fn find_list_mut(data: &mut SessionData, list_id: ListId) -> TodoStoreResult<&mut TodoList> {
    lists_mut(data)
        .iter_mut()
        .find(|list| list.id == list_id)
        .ok_or_else(|| TodoStoreError::not_found("List", list_id))
}

fn find_todo_mut(list: &mut TodoList, todo_id: TodoId) -> TodoStoreResult<&mut Todo> {
    let list_id = list.id;
    list.todos
        .iter_mut()
        .find(|todo| todo.id == todo_id)
        .ok_or_else(|| TodoStoreError::todo_not_found(list_id, todo_id))
}

#[async_trait]
impl TodoStore for SessionTodoStore {
    async fn find_list(&self, list_id: ListId) -> TodoStoreResult<Option<ListSummary>> {
        let data = self.read()?;
        Ok(lists(&data)
            .iter()
            .find(|list| list.id == list_id)
            .map(TodoList::summary))
    }

    async fn all_lists(&self) -> TodoStoreResult<Vec<ListSummary>> {
        let data = self.read()?;
        let mut summaries: Vec<ListSummary> = lists(&data).iter().map(TodoList::summary).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }

    async fn list_complete(&self, list_id: ListId) -> TodoStoreResult<bool> {
        let data = self.read()?;
        lists(&data)
            .iter()
            .find(|list| list.id == list_id)
            .map(TodoList::is_complete)
            .ok_or_else(|| TodoStoreError::not_found("List", list_id))
    }

    async fn new_list(&self, name: &str) -> TodoStoreResult<()> {
        let mut data = self.write()?;
        let lists = lists_mut(&mut data);
        let id = next_id(lists.iter().map(|list| list.id))?;
        lists.push(TodoList::new(id, name));
        tracing::debug!(list_id = id, "Created list");
        Ok(())
    }

    async fn rename_list(&self, list_id: ListId, new_name: &str) -> TodoStoreResult<()> {
        let mut data = self.write()?;
        find_list_mut(&mut data, list_id)?.name = new_name.to_string();
        Ok(())
    }

    async fn delete_list(&self, list_id: ListId) -> TodoStoreResult<()> {
        let mut data = self.write()?;
        let lists = lists_mut(&mut data);
        let before = lists.len();
        lists.retain(|list| list.id != list_id);
        if lists.len() == before {
            return Err(TodoStoreError::not_found("List", list_id));
        }
        Ok(())
    }

    async fn add_todo(&self, list_id: ListId, name: &str) -> TodoStoreResult<()> {
        let mut data = self.write()?;
        let list = find_list_mut(&mut data, list_id)?;
        let id = next_id(list.todos.iter().map(|todo| todo.id))?;
        list.todos.push(Todo::new(id, name));
        tracing::debug!(list_id, todo_id = id, "Added todo");
        Ok(())
    }

    async fn delete_todo(&self, list_id: ListId, todo_id: TodoId) -> TodoStoreResult<()> {
        let mut data = self.write()?;
        let list = find_list_mut(&mut data, list_id)?;
        let before = list.todos.len();
        list.todos.retain(|todo| todo.id != todo_id);
        if list.todos.len() == before {
            return Err(TodoStoreError::todo_not_found(list_id, todo_id));
        }
        Ok(())
    }

    async fn set_todo_status(
        &self,
        list_id: ListId,
        todo_id: TodoId,
        completed: bool,
    ) -> TodoStoreResult<()> {
        let mut data = self.write()?;
        let list = find_list_mut(&mut data, list_id)?;
        find_todo_mut(list, todo_id)?.completed = completed;
        Ok(())
    }

    async fn complete_all_todos(&self, list_id: ListId) -> TodoStoreResult<()> {
        let mut data = self.write()?;
        for todo in &mut find_list_mut(&mut data, list_id)?.todos {
            todo.completed = true;
        }
        Ok(())
    }

    async fn find_todos_for_list(&self, list_id: ListId) -> TodoStoreResult<Vec<Todo>> {
        let data = self.read()?;
        Ok(lists(&data)
            .iter()
            .find(|list| list.id == list_id)
            .map(|list| list.todos.clone())
            .unwrap_or_default())
    }

    async fn find_list_with_todos(&self, list_id: ListId) -> TodoStoreResult<Option<TodoList>> {
        let data = self.read()?;
        Ok(lists(&data).iter().find(|list| list.id == list_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(std::iter::empty()).unwrap(), 1);
        assert_eq!(next_id([3, 1, 2].into_iter()).unwrap(), 4);
    }

    #[tokio::test]
    async fn test_exhausted_ids_are_invalid_data() {
        let mut full = TodoList::new(1, "Full");
        full.todos.push(Todo::new(i64::MAX, "Last"));
        let session = shared_session(SessionData {
            lists: Some(vec![TodoList::new(i64::MAX, "Last"), full]),
        });
        let store = SessionTodoStore::new(session.clone());

        assert!(matches!(
            store.new_list("Overflow").await,
            Err(TodoStoreError::InvalidData(_))
        ));
        assert!(matches!(
            store.add_todo(1, "Overflow").await,
            Err(TodoStoreError::InvalidData(_))
        ));
        assert_eq!(session.read().unwrap().lists.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_poisoned_session_is_an_error() {
        let session = shared_session(SessionData::new());
        let poisoner = session.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.write().unwrap();
            panic!("poison the session lock");
        })
        .join();
        assert!(session.is_poisoned());

        let store = SessionTodoStore::new(session);

        assert!(matches!(
            store.all_lists().await,
            Err(TodoStoreError::Other(_))
        ));
        assert!(matches!(
            store.new_list("Groceries").await,
            Err(TodoStoreError::Other(_))
        ));
    }

    #[test]
    fn test_new_initializes_list_slot() {
        let session = shared_session(SessionData::new());
        assert!(session.read().unwrap().lists.is_none());

        let _store = SessionTodoStore::new(session.clone());

        assert_eq!(session.read().unwrap().lists, Some(Vec::new()));
    }

    #[test]
    fn test_new_keeps_existing_lists() {
        let session = shared_session(SessionData {
            lists: Some(vec![TodoList::new(5, "Existing")]),
        });

        let _store = SessionTodoStore::new(session.clone());

        assert_eq!(session.read().unwrap().lists.as_ref().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ids_reuse_max_plus_one() {
        let store = SessionTodoStore::in_memory();
        store.new_list("A").await.unwrap();
        store.new_list("B").await.unwrap();
        store.delete_list(2).await.unwrap();
        store.new_list("C").await.unwrap();

        let ids: Vec<i64> = store.all_lists().await.unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2]);

        store.add_todo(1, "x").await.unwrap();
        store.add_todo(1, "y").await.unwrap();
        store.add_todo(2, "z").await.unwrap();

        let todos = store.find_todos_for_list(2).await.unwrap();
        assert_eq!(todos, vec![Todo::new(1, "z")]);
    }

    #[tokio::test]
    async fn test_mutations_are_visible_through_session() {
        let session = shared_session(SessionData::new());
        let store = SessionTodoStore::new(session.clone());

        store.new_list("Groceries").await.unwrap();
        store.add_todo(1, "Milk").await.unwrap();

        let data = session.read().unwrap();
        let lists = data.lists.as_ref().unwrap();
        assert_eq!(lists[0].name, "Groceries");
        assert_eq!(lists[0].todos, vec![Todo::new(1, "Milk")]);
    }

    #[tokio::test]
    async fn test_session_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        assert_eq!(SessionData::load(&path).unwrap(), SessionData::new());

        let store = SessionTodoStore::in_memory();
        store.new_list("Chores").await.unwrap();
        store.add_todo(1, "Dishes").await.unwrap();
        store.session().read().unwrap().save(&path).unwrap();

        let loaded = SessionData::load(&path).unwrap();
        let reopened = SessionTodoStore::new(shared_session(loaded));
        let list = reopened.find_list_with_todos(1).await.unwrap().unwrap();
        assert_eq!(list.name, "Chores");
        assert_eq!(list.todos, vec![Todo::new(1, "Dishes")]);
    }

    #[test]
    fn test_load_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            SessionData::load(&path),
            Err(TodoStoreError::Serialization(_))
        ));
    }
}

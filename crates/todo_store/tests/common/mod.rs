//! Behavioral checks shared by every todo store backend.
//!
//! Each check expects an empty store and assumes list ids start at 1.

use entities::Todo;
use todo_store::{TodoStore, TodoStoreError};

// =============================================================================
// Checks
// =============================================================================

pub async fn empty_store_has_no_lists(store: &dyn TodoStore) {
    assert!(store.all_lists().await.unwrap().is_empty());
    assert!(store.find_list(1).await.unwrap().is_none());
    assert!(store.find_todos_for_list(1).await.unwrap().is_empty());
    assert!(store.find_list_with_todos(1).await.unwrap().is_none());
}

pub async fn groceries_scenario(store: &dyn TodoStore) {
    store.new_list("Groceries").await.unwrap();
    store.add_todo(1, "Milk").await.unwrap();
    store.add_todo(1, "Eggs").await.unwrap();

    let todos = store.find_todos_for_list(1).await.unwrap();
    assert_eq!(todos, vec![Todo::new(1, "Milk"), Todo::new(2, "Eggs")]);

    store.set_todo_status(1, 1, true).await.unwrap();

    let summary = store.find_list(1).await.unwrap().unwrap();
    assert_eq!(summary.name, "Groceries");
    assert_eq!(summary.todos_count, 2);
    assert_eq!(summary.todos_remaining_count, 1);
    assert!(!store.list_complete(1).await.unwrap());

    store.complete_all_todos(1).await.unwrap();
    assert!(store.list_complete(1).await.unwrap());
    assert_eq!(
        store.find_list(1).await.unwrap().unwrap().todos_remaining_count,
        0
    );
}

pub async fn empty_list_is_complete(store: &dyn TodoStore) {
    store.new_list("Nothing yet").await.unwrap();

    let summary = store.find_list(1).await.unwrap().unwrap();
    assert_eq!(summary.todos_count, 0);
    assert_eq!(summary.todos_remaining_count, 0);
    assert!(store.list_complete(1).await.unwrap());

    // Completing nothing is not an error.
    store.complete_all_todos(1).await.unwrap();
}

pub async fn counts_match_todos(store: &dyn TodoStore) {
    store.new_list("Work").await.unwrap();
    store.new_list("Home").await.unwrap();
    for name in ["a", "b", "c", "d"] {
        store.add_todo(1, name).await.unwrap();
    }
    store.add_todo(2, "e").await.unwrap();

    let work = store.find_todos_for_list(1).await.unwrap();
    store.set_todo_status(1, work[0].id, true).await.unwrap();
    store.set_todo_status(1, work[2].id, true).await.unwrap();

    for summary in store.all_lists().await.unwrap() {
        let todos = store.find_todos_for_list(summary.id).await.unwrap();
        let remaining = todos.iter().filter(|t| !t.completed).count() as u64;

        assert_eq!(summary.todos_count, todos.len() as u64);
        assert_eq!(summary.todos_remaining_count, remaining);
        assert!(summary.todos_count >= summary.todos_remaining_count);
        assert_eq!(
            store.list_complete(summary.id).await.unwrap(),
            todos.iter().all(|t| t.completed)
        );
    }
}

pub async fn add_todo_round_trip(store: &dyn TodoStore) {
    store.new_list("Errands").await.unwrap();
    store.add_todo(1, "first").await.unwrap();
    let before = store.find_todos_for_list(1).await.unwrap();

    store.add_todo(1, "x").await.unwrap();

    let after = store.find_todos_for_list(1).await.unwrap();
    assert_eq!(after.len(), before.len() + 1);
    let added: Vec<&Todo> = after
        .iter()
        .filter(|t| !before.iter().any(|b| b.id == t.id))
        .collect();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].name, "x");
    assert!(!added[0].completed);
}

pub async fn complete_all_is_idempotent(store: &dyn TodoStore) {
    store.new_list("Chores").await.unwrap();
    store.add_todo(1, "Dishes").await.unwrap();
    store.add_todo(1, "Laundry").await.unwrap();

    store.complete_all_todos(1).await.unwrap();
    let once = store.find_list_with_todos(1).await.unwrap();
    store.complete_all_todos(1).await.unwrap();
    let twice = store.find_list_with_todos(1).await.unwrap();

    assert_eq!(once, twice);
    assert!(twice.unwrap().todos.iter().all(|t| t.completed));
}

pub async fn delete_list_cascades(store: &dyn TodoStore) {
    store.new_list("Keep").await.unwrap();
    store.new_list("Drop").await.unwrap();
    store.add_todo(1, "kept").await.unwrap();
    store.add_todo(2, "dropped").await.unwrap();
    store.add_todo(2, "dropped too").await.unwrap();

    store.delete_list(2).await.unwrap();

    assert!(store.find_list(2).await.unwrap().is_none());
    assert!(store.find_todos_for_list(2).await.unwrap().is_empty());
    assert!(store.find_list_with_todos(2).await.unwrap().is_none());
    let remaining: Vec<i64> = store
        .all_lists()
        .await
        .unwrap()
        .iter()
        .map(|l| l.id)
        .collect();
    assert_eq!(remaining, vec![1]);
    assert_eq!(store.find_todos_for_list(1).await.unwrap().len(), 1);
}

pub async fn lists_ordered_by_name(store: &dyn TodoStore) {
    store.new_list("Zoo").await.unwrap();
    store.new_list("Apples").await.unwrap();
    store.new_list("Market").await.unwrap();
    store.new_list("Apples").await.unwrap();

    let lists = store.all_lists().await.unwrap();
    let order: Vec<(&str, i64)> = lists.iter().map(|l| (l.name.as_str(), l.id)).collect();
    assert_eq!(
        order,
        vec![("Apples", 2), ("Apples", 4), ("Market", 3), ("Zoo", 1)]
    );
}

pub async fn rename_and_delete_todo(store: &dyn TodoStore) {
    store.new_list("Draft").await.unwrap();
    store.add_todo(1, "one").await.unwrap();
    store.add_todo(1, "two").await.unwrap();

    store.rename_list(1, "Final").await.unwrap();
    store.delete_todo(1, 1).await.unwrap();

    let list = store.find_list_with_todos(1).await.unwrap().unwrap();
    assert_eq!(list.name, "Final");
    assert_eq!(list.todos, vec![Todo::new(2, "two")]);

    store.set_todo_status(1, 2, true).await.unwrap();
    store.set_todo_status(1, 2, false).await.unwrap();
    assert!(!store.find_todos_for_list(1).await.unwrap()[0].completed);
}

pub async fn missing_targets_are_not_found(store: &dyn TodoStore) {
    store.new_list("Only").await.unwrap();
    store.add_todo(1, "task").await.unwrap();

    let results = vec![
        store.rename_list(9, "x").await,
        store.delete_list(9).await,
        store.add_todo(9, "x").await,
        store.delete_todo(1, 9).await,
        store.delete_todo(9, 1).await,
        store.set_todo_status(1, 9, true).await,
        store.complete_all_todos(9).await,
    ];
    for result in results {
        assert!(
            matches!(result, Err(TodoStoreError::NotFound { .. })),
            "expected NotFound, got {result:?}"
        );
    }
    assert!(matches!(
        store.list_complete(9).await,
        Err(TodoStoreError::NotFound { .. })
    ));

    // Nothing changed.
    let list = store.find_list_with_todos(1).await.unwrap().unwrap();
    assert_eq!(list.name, "Only");
    assert_eq!(list.todos, vec![Todo::new(1, "task")]);
}

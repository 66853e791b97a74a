//! SQLite todo store.
//!
//! Used for single-user local deployments and as the relational backend in
//! tests. SQLite has no boolean type, so completion is stored as a `'t'`/`'f'`
//! token and decoded strictly on read.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use entities::{completion, ListId, ListSummary, Todo, TodoId};
use sqlx::{
    query::Query,
    sqlite::{SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row, Sqlite, SqliteExecutor,
};

use crate::{
    statement::decode_count, DiagnosticsSink, Param, Statement, TodoStore, TodoStoreError,
    TodoStoreResult, TracingSink,
};

const CREATE_LISTS: &str = r#"
    CREATE TABLE IF NOT EXISTS lists (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
"#;

const CREATE_TODOS: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        list_id INTEGER NOT NULL REFERENCES lists (id),
        name TEXT NOT NULL,
        completed TEXT NOT NULL DEFAULT 'f'
    )
"#;

const CREATE_TODOS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_todos_list_id ON todos (list_id)";

const FIND_LIST: &str = r#"
    SELECT lists.id, lists.name,
           COUNT(todos.id) AS todos_count,
           COUNT(NULLIF(todos.completed, 't')) AS todos_remaining_count,
           COUNT(CASE WHEN todos.completed NOT IN ('t', 'f') THEN 1 END) AS unknown_tokens
    FROM lists
    LEFT JOIN todos ON todos.list_id = lists.id
    WHERE lists.id = ?
    GROUP BY lists.id
"#;

const ALL_LISTS: &str = r#"
    SELECT lists.id, lists.name,
           COUNT(todos.id) AS todos_count,
           COUNT(NULLIF(todos.completed, 't')) AS todos_remaining_count,
           COUNT(CASE WHEN todos.completed NOT IN ('t', 'f') THEN 1 END) AS unknown_tokens
    FROM lists
    LEFT JOIN todos ON todos.list_id = lists.id
    GROUP BY lists.id
    ORDER BY lists.name, lists.id
"#;

const LIST_EXISTS: &str = "SELECT id FROM lists WHERE id = ?";

const FIND_TODOS: &str = "SELECT id, name, completed FROM todos WHERE list_id = ? ORDER BY id";

/// SQLite todo store (single-user mode).
#[derive(Clone)]
pub struct SqliteTodoStore {
    pool: SqlitePool,
    sink: Arc<dyn DiagnosticsSink>,
}

impl SqliteTodoStore {
    /// Creates a store over an existing pool, logging statements via tracing.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            sink: Arc::new(TracingSink),
        }
    }

    /// Connects to `database_url` and initializes the schema.
    pub async fn connect(database_url: &str, max_connections: u32) -> TodoStoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| TodoStoreError::Connection(format!("failed to connect: {e}")))?;

        tracing::debug!(max_connections, "Connected to SQLite");

        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Opens a private in-memory database.
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// every SQLite in-memory connection is its own database.
    pub async fn in_memory() -> TodoStoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| TodoStoreError::Connection(format!("failed to open: {e}")))?;

        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Replaces the diagnostics sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the tables if they do not exist.
    pub async fn init(&self) -> TodoStoreResult<()> {
        for sql in [CREATE_LISTS, CREATE_TODOS, CREATE_TODOS_INDEX] {
            self.execute(&self.pool, Statement::new(sql)).await?;
        }
        Ok(())
    }

    async fn execute<'e, E>(&self, executor: E, statement: Statement) -> TodoStoreResult<u64>
    where
        E: SqliteExecutor<'e>,
    {
        self.sink.record(&statement);
        let result = bind_params(&statement).execute(executor).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&self, statement: Statement) -> TodoStoreResult<Vec<SqliteRow>> {
        self.sink.record(&statement);
        Ok(bind_params(&statement).fetch_all(&self.pool).await?)
    }

    async fn fetch_optional(&self, statement: Statement) -> TodoStoreResult<Option<SqliteRow>> {
        self.sink.record(&statement);
        Ok(bind_params(&statement).fetch_optional(&self.pool).await?)
    }

    async fn ensure_list_exists(&self, list_id: ListId) -> TodoStoreResult<()> {
        self.fetch_optional(Statement::new(LIST_EXISTS).bind(list_id))
            .await?
            .map(|_| ())
            .ok_or_else(|| TodoStoreError::not_found("List", list_id))
    }
}

fn bind_params(statement: &Statement) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    let mut query = sqlx::query(statement.sql);
    for param in &statement.params {
        query = match param {
            Param::Int(v) => query.bind(*v),
            Param::Text(v) => query.bind(v.clone()),
            Param::Bool(v) => query.bind(completion::to_token(*v)),
        };
    }
    query
}

fn summary_from_row(row: &SqliteRow) -> TodoStoreResult<ListSummary> {
    let id: ListId = row.try_get("id")?;
    let unknown: i64 = row.try_get("unknown_tokens")?;
    if unknown != 0 {
        return Err(TodoStoreError::invalid_data(format!(
            "list {id} has {unknown} todo(s) with an unknown completion token"
        )));
    }

    Ok(ListSummary {
        id,
        name: row.try_get("name")?,
        todos_count: decode_count(row.try_get("todos_count")?)?,
        todos_remaining_count: decode_count(row.try_get("todos_remaining_count")?)?,
    })
}

fn todo_from_row(row: &SqliteRow) -> TodoStoreResult<Todo> {
    let id: TodoId = row.try_get("id")?;
    let token: Option<String> = row.try_get("completed")?;
    let completed = token
        .as_deref()
        .and_then(completion::parse_token)
        .ok_or_else(|| {
            TodoStoreError::invalid_data(format!(
                "todo {id} has completion token {token:?}, expected \"t\" or \"f\""
            ))
        })?;

    Ok(Todo {
        id,
        name: row.try_get("name")?,
        completed,
    })
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn find_list(&self, list_id: ListId) -> TodoStoreResult<Option<ListSummary>> {
        self.fetch_optional(Statement::new(FIND_LIST).bind(list_id))
            .await?
            .as_ref()
            .map(summary_from_row)
            .transpose()
    }

    async fn all_lists(&self) -> TodoStoreResult<Vec<ListSummary>> {
        self.fetch_all(Statement::new(ALL_LISTS))
            .await?
            .iter()
            .map(summary_from_row)
            .collect()
    }

    async fn new_list(&self, name: &str) -> TodoStoreResult<()> {
        self.execute(
            &self.pool,
            Statement::new("INSERT INTO lists (name) VALUES (?)").bind(name),
        )
        .await?;
        Ok(())
    }

    async fn rename_list(&self, list_id: ListId, new_name: &str) -> TodoStoreResult<()> {
        let updated = self
            .execute(
                &self.pool,
                Statement::new("UPDATE lists SET name = ? WHERE id = ?")
                    .bind(new_name)
                    .bind(list_id),
            )
            .await?;
        if updated == 0 {
            return Err(TodoStoreError::not_found("List", list_id));
        }
        Ok(())
    }

    async fn delete_list(&self, list_id: ListId) -> TodoStoreResult<()> {
        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.pool.begin().await?;

        self.execute(
            &mut *tx,
            Statement::new("DELETE FROM todos WHERE list_id = ?").bind(list_id),
        )
        .await?;
        let deleted = self
            .execute(
                &mut *tx,
                Statement::new("DELETE FROM lists WHERE id = ?").bind(list_id),
            )
            .await?;

        if deleted == 0 {
            tx.rollback().await?;
            tracing::warn!(list_id, "Rolled back delete of missing list");
            return Err(TodoStoreError::not_found("List", list_id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn add_todo(&self, list_id: ListId, name: &str) -> TodoStoreResult<()> {
        let inserted = self
            .execute(
                &self.pool,
                Statement::new(
                    "INSERT INTO todos (list_id, name, completed) SELECT id, ?, 'f' FROM lists WHERE id = ?",
                )
                .bind(name)
                .bind(list_id),
            )
            .await?;
        if inserted == 0 {
            return Err(TodoStoreError::not_found("List", list_id));
        }
        Ok(())
    }

    async fn delete_todo(&self, list_id: ListId, todo_id: TodoId) -> TodoStoreResult<()> {
        let deleted = self
            .execute(
                &self.pool,
                Statement::new("DELETE FROM todos WHERE list_id = ? AND id = ?")
                    .bind(list_id)
                    .bind(todo_id),
            )
            .await?;
        if deleted == 0 {
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
        let updated = self
            .execute(
                &self.pool,
                Statement::new("UPDATE todos SET completed = ? WHERE list_id = ? AND id = ?")
                    .bind(completed)
                    .bind(list_id)
                    .bind(todo_id),
            )
            .await?;
        if updated == 0 {
            return Err(TodoStoreError::todo_not_found(list_id, todo_id));
        }
        Ok(())
    }

    async fn complete_all_todos(&self, list_id: ListId) -> TodoStoreResult<()> {
        let updated = self
            .execute(
                &self.pool,
                Statement::new("UPDATE todos SET completed = 't' WHERE list_id = ?").bind(list_id),
            )
            .await?;
        if updated == 0 {
            self.ensure_list_exists(list_id).await?;
        }
        Ok(())
    }

    async fn find_todos_for_list(&self, list_id: ListId) -> TodoStoreResult<Vec<Todo>> {
        self.fetch_all(Statement::new(FIND_TODOS).bind(list_id))
            .await?
            .iter()
            .map(todo_from_row)
            .collect()
    }

    async fn close(&self) {
        tracing::debug!("Closing SQLite pool");
        self.pool.close().await;
    }
}

//! Todos command-line host.
//!
//! Maps each subcommand onto one [`TodoStore`] operation and renders the
//! result as text or JSON.

use std::fmt;

use clap::Subcommand;
use entities::{ListId, ListSummary, Todo, TodoId, TodoList};
use serde::Serialize;
use todo_store::{TodoStore, TodoStoreError, TodoStoreResult};

/// Store operations exposed on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List all lists with their counts
    Lists,
    /// Show one list with its todos
    Show { list_id: ListId },
    /// Show the todos of a list
    Todos { list_id: ListId },
    /// Report whether every todo in a list is done
    Status { list_id: ListId },
    /// Create a list
    NewList { name: String },
    /// Rename a list
    RenameList { list_id: ListId, name: String },
    /// Delete a list and its todos
    DeleteList { list_id: ListId },
    /// Add a todo to a list
    Add { list_id: ListId, name: String },
    /// Delete a todo
    DeleteTodo { list_id: ListId, todo_id: TodoId },
    /// Mark a todo as done
    Check { list_id: ListId, todo_id: TodoId },
    /// Mark a todo as not done
    Uncheck { list_id: ListId, todo_id: TodoId },
    /// Mark every todo in a list as done
    CompleteAll { list_id: ListId },
}

/// Result of running a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Output {
    Lists(Vec<ListSummary>),
    List(TodoList),
    Todos(Vec<Todo>),
    Status { list_id: ListId, complete: bool },
    Done,
}

impl Output {
    /// Renders the output as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn write_todo(f: &mut fmt::Formatter<'_>, todo: &Todo) -> fmt::Result {
    let mark = if todo.completed { "x" } else { " " };
    writeln!(f, "  [{mark}] {:>3}  {}", todo.id, todo.name)
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lists(lists) if lists.is_empty() => writeln!(f, "No lists."),
            Self::Lists(lists) => {
                for list in lists {
                    writeln!(
                        f,
                        "{:>3}  {} ({}/{} remaining)",
                        list.id, list.name, list.todos_remaining_count, list.todos_count
                    )?;
                }
                Ok(())
            }
            Self::List(list) => {
                writeln!(f, "{}", list.name)?;
                list.todos.iter().try_for_each(|todo| write_todo(f, todo))
            }
            Self::Todos(todos) => todos.iter().try_for_each(|todo| write_todo(f, todo)),
            Self::Status { list_id, complete } => {
                let state = if *complete { "complete" } else { "incomplete" };
                writeln!(f, "List {list_id} is {state}.")
            }
            Self::Done => Ok(()),
        }
    }
}

/// Runs one command against a store.
pub async fn run<S>(store: &S, command: Command) -> TodoStoreResult<Output>
where
    S: TodoStore + ?Sized,
{
    tracing::debug!(?command, "Running command");

    let output = match command {
        Command::Lists => Output::Lists(store.all_lists().await?),
        Command::Show { list_id } => Output::List(
            store
                .find_list_with_todos(list_id)
                .await?
                .ok_or_else(|| TodoStoreError::not_found("List", list_id))?,
        ),
        Command::Todos { list_id } => Output::Todos(store.find_todos_for_list(list_id).await?),
        Command::Status { list_id } => Output::Status {
            list_id,
            complete: store.list_complete(list_id).await?,
        },
        Command::NewList { name } => {
            store.new_list(&name).await?;
            Output::Done
        }
        Command::RenameList { list_id, name } => {
            store.rename_list(list_id, &name).await?;
            Output::Done
        }
        Command::DeleteList { list_id } => {
            store.delete_list(list_id).await?;
            Output::Done
        }
        Command::Add { list_id, name } => {
            store.add_todo(list_id, &name).await?;
            Output::Done
        }
        Command::DeleteTodo { list_id, todo_id } => {
            store.delete_todo(list_id, todo_id).await?;
            Output::Done
        }
        Command::Check { list_id, todo_id } => {
            store.set_todo_status(list_id, todo_id, true).await?;
            Output::Done
        }
        Command::Uncheck { list_id, todo_id } => {
            store.set_todo_status(list_id, todo_id, false).await?;
            Output::Done
        }
        Command::CompleteAll { list_id } => {
            store.complete_all_todos(list_id).await?;
            Output::Done
        }
    };

    Ok(output)
}

/// Initializes tracing with the given log level.
///
/// `RUST_LOG` takes precedence when set. Logs go to stderr so command output
/// stays clean.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

//! Store configuration and backend selection.

use std::{env, str::FromStr};

use thiserror::Error;

use crate::{
    PostgresTodoStore, SessionTodoStore, SharedSession, SqliteTodoStore, TodoStore,
    TodoStoreResult,
};

/// Local database used outside production.
pub const DEFAULT_POSTGRES_URL: &str = "postgres://localhost/todos";

/// Local SQLite file used when no URL is configured.
pub const DEFAULT_SQLITE_URL: &str = "sqlite:todos.db?mode=rwc";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is missing.
    #[error("{0} is required in production")]
    Missing(&'static str),

    /// A variable has a value that cannot be used.
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Postgres,
    Sqlite,
    Session,
}

impl BackendKind {
    /// Converts the kind to its configuration string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
            Self::Session => "session",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            "session" | "memory" => Ok(Self::Session),
            _ => Err(ConfigError::Invalid {
                name: "TODOS_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

/// Store configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Backend to use.
    pub backend: BackendKind,
    /// Connection string for relational backends.
    pub database_url: String,
    /// Whether running in production.
    pub production: bool,
    /// Pool size for relational backends.
    pub max_connections: u32,
    /// Log level.
    pub log_level: String,
}

impl StoreConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let production = lookup("TODOS_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let backend = match lookup("TODOS_BACKEND") {
            Some(value) => value.parse()?,
            None => BackendKind::default(),
        };

        let database_url = match (lookup("DATABASE_URL"), backend) {
            (Some(url), _) => url,
            (None, BackendKind::Postgres) if production => {
                return Err(ConfigError::Missing("DATABASE_URL"));
            }
            (None, BackendKind::Postgres) => DEFAULT_POSTGRES_URL.to_string(),
            (None, BackendKind::Sqlite) => DEFAULT_SQLITE_URL.to_string(),
            (None, BackendKind::Session) => String::new(),
        };

        let max_connections = match lookup("TODOS_MAX_CONNECTIONS") {
            Some(value) => match value.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "TODOS_MAX_CONNECTIONS",
                        value,
                    })
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            backend,
            database_url,
            production,
            max_connections,
            log_level: lookup("TODOS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Connects the configured backend.
///
/// `session` is only used by the session backend.
pub async fn connect_store(
    config: &StoreConfig,
    session: SharedSession,
) -> TodoStoreResult<Box<dyn TodoStore>> {
    tracing::debug!(backend = config.backend.as_str(), "Connecting todo store");

    let store: Box<dyn TodoStore> = match config.backend {
        BackendKind::Postgres => Box::new(
            PostgresTodoStore::connect(&config.database_url, config.max_connections).await?,
        ),
        BackendKind::Sqlite => Box::new(
            SqliteTodoStore::connect(&config.database_url, config.max_connections).await?,
        ),
        BackendKind::Session => Box::new(SessionTodoStore::new(session)),
    };
    Ok(store)
}

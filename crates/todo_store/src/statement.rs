//! Parameterized statements and the diagnostics sink that records them.
//!
//! Relational backends never interpolate values into SQL. Each statement is a
//! static SQL string plus typed parameters, and every statement is handed to a
//! [`DiagnosticsSink`] before it runs.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// Integer parameter (ids).
    Int(i64),
    /// Text parameter (names, tokens).
    Text(String),
    /// Completion flag. Backends without a native boolean bind the token.
    Bool(bool),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// A SQL statement with its parameters.
#[derive(Debug, Clone)]
pub struct Statement {
    /// SQL text with positional placeholders.
    pub sql: &'static str,
    /// Parameters in placeholder order.
    pub params: Vec<Param>,
}

impl Statement {
    /// Creates a statement without parameters.
    pub fn new(sql: &'static str) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    /// Appends a parameter.
    pub fn bind(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Renders the parameters as `[a, b, c]` for logging.
    pub fn params_display(&self) -> String {
        let rendered: Vec<String> = self.params.iter().map(Param::to_string).collect();
        format!("[{}]", rendered.join(", "))
    }
}

/// Converts a SQL `COUNT` result into an unsigned count.
pub(crate) fn decode_count(value: i64) -> crate::TodoStoreResult<u64> {
    u64::try_from(value)
        .map_err(|_| crate::TodoStoreError::invalid_data(format!("negative count: {value}")))
}

/// Receives every statement a relational backend executes.
pub trait DiagnosticsSink: Send + Sync {
    /// Records a statement. Called before execution, whatever the outcome.
    fn record(&self, statement: &Statement);
}

/// Logs statements through `tracing` at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, statement: &Statement) {
        tracing::info!(
            statement = statement.sql,
            params = %statement.params_display(),
            "Executing statement"
        );
    }
}

/// A recorded `(statement, params)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStatement {
    pub sql: String,
    pub params: Vec<Param>,
}

/// Keeps every statement in memory.
///
/// Clones share the same buffer, so one handle can be given to a store and
/// another kept for inspection.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    statements: Arc<Mutex<Vec<RecordedStatement>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.statements
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Discards everything recorded so far.
    pub fn clear(&self) {
        let mut statements = self
            .statements
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        statements.clear();
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, statement: &Statement) {
        let mut statements = self
            .statements
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        statements.push(RecordedStatement {
            sql: statement.sql.to_string(),
            params: statement.params.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_params_display() {
        let stmt = Statement::new("UPDATE todos SET completed = $1 WHERE list_id = $2 AND id = $3")
            .bind(true)
            .bind(1_i64)
            .bind(2_i64);

        assert_eq!(stmt.params_display(), "[true, 1, 2]");
        assert_eq!(Statement::new("SELECT 1").params_display(), "[]");
        assert_eq!(
            Statement::new("INSERT").bind("Milk").params_display(),
            "[\"Milk\"]"
        );
    }

    #[test]
    fn test_memory_sink_shares_buffer() {
        let sink = MemorySink::new();
        let handle = sink.clone();

        sink.record(&Statement::new("DELETE FROM lists WHERE id = $1").bind(4_i64));

        let recorded = handle.statements();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].sql, "DELETE FROM lists WHERE id = $1");
        assert_eq!(recorded[0].params, vec![Param::Int(4)]);

        handle.clear();
        assert!(sink.statements().is_empty());
    }
}

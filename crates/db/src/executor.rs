//! Query executor for report templates.
//!
//! Binds the `:name` parameters of a [`QuerySpec`] to the backend's positional
//! placeholders and runs the statement on the shared connection pool.

use std::collections::BTreeMap;

use declstat_core::reports::{ParamValue, QuerySpec, ReportError};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement, Value,
};
use tracing::{debug, error};

/// Error types for query execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The template references a parameter that has no bound value.
    #[error("Query references unknown parameter :{0}")]
    UnknownParameter(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ExecutorError> for ReportError {
    fn from(err: ExecutorError) -> Self {
        Self::QueryExecution(err.to_string())
    }
}

fn to_value(value: &ParamValue) -> Value {
    match value {
        ParamValue::Date(date) => Value::from(*date),
        ParamValue::Timestamp(timestamp) => Value::from(*timestamp),
        ParamValue::Text(text) => Value::from(text.clone()),
    }
}

/// Rewrites `:name` parameters into positional placeholders.
///
/// Postgres gets `$n`, reusing the same index when a name repeats; other
/// backends get one `?` and one value per occurrence. Colons inside quoted
/// literals and `::` casts are left alone.
pub fn bind_named(
    backend: DbBackend,
    template: &str,
    params: &BTreeMap<&'static str, ParamValue>,
) -> Result<(String, Vec<Value>), ExecutorError> {
    let mut sql = String::with_capacity(template.len());
    let mut values = Vec::new();
    let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
    let mut in_literal = false;
    let mut prev = None;
    let mut chars = template.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let starts_param = c == ':'
            && !in_literal
            && prev != Some(':')
            && chars
                .peek()
                .is_some_and(|&(_, next)| next.is_ascii_alphabetic() || next == '_');

        if !starts_param {
            if c == '\'' {
                in_literal = !in_literal;
            }
            sql.push(c);
            prev = Some(c);
            continue;
        }

        let start = i + 1;
        let mut end = start;
        while let Some(&(j, next)) = chars.peek() {
            if !(next.is_ascii_alphanumeric() || next == '_') {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }
        let name = &template[start..end];
        let value = params
            .get(name)
            .ok_or_else(|| ExecutorError::UnknownParameter(name.to_string()))?;

        if backend == DbBackend::Postgres {
            let index = if let Some(&index) = positions.get(name) {
                index
            } else {
                values.push(to_value(value));
                positions.insert(name, values.len());
                values.len()
            };
            sql.push('$');
            sql.push_str(&index.to_string());
        } else {
            values.push(to_value(value));
            sql.push('?');
        }
        prev = name.chars().last();
    }

    Ok((sql, values))
}

/// Runs report queries on a pooled connection.
///
/// Each call checks a connection out of the pool and returns it when the
/// statement finishes, whether or not it succeeded.
#[derive(Debug, Clone)]
pub struct ReportExecutor {
    db: DatabaseConnection,
}

impl ReportExecutor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn statement(&self, spec: &QuerySpec) -> Result<Statement, ExecutorError> {
        let backend = self.db.get_database_backend();
        let (sql, values) = bind_named(backend, &spec.sql(), spec.parameters())?;
        debug!(
            kind = spec.kind().as_str(),
            family = %spec.family(),
            parameters = ?spec.parameters(),
            sql = %sql,
            "Executing report query"
        );
        Ok(Statement::from_sql_and_values(backend, sql, values))
    }

    /// Runs `spec` and decodes every returned row.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the database rejects the query.
    pub async fn execute_many<T: FromQueryResult>(
        &self,
        spec: &QuerySpec,
    ) -> Result<Vec<T>, ExecutorError> {
        let statement = self.statement(spec)?;
        T::find_by_statement(statement)
            .all(&self.db)
            .await
            .map_err(|err| {
                error!(kind = spec.kind().as_str(), family = %spec.family(), error = %err, "Report query failed");
                ExecutorError::Database(err)
            })
    }

    /// Runs `spec` and decodes the first returned row, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the database rejects the query.
    pub async fn execute_one<T: FromQueryResult>(
        &self,
        spec: &QuerySpec,
    ) -> Result<Option<T>, ExecutorError> {
        let statement = self.statement(spec)?;
        T::find_by_statement(statement)
            .one(&self.db)
            .await
            .map_err(|err| {
                error!(kind = spec.kind().as_str(), family = %spec.family(), error = %err, "Report query failed");
                ExecutorError::Database(err)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn params() -> BTreeMap<&'static str, ParamValue> {
        BTreeMap::from([
            (
                "beginDate",
                ParamValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            ),
            (
                "endDate",
                ParamValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
            ),
            ("pattern", ParamValue::Text("TEST%".to_string())),
        ])
    }

    #[test]
    fn test_postgres_placeholders_reuse_indices() {
        let (sql, values) = bind_named(
            DbBackend::Postgres,
            "a >= :beginDate AND a < :endDate AND b >= :beginDate",
            &params(),
        )
        .unwrap();
        assert_eq!(sql, "a >= $1 AND a < $2 AND b >= $1");
        assert_eq!(values.len(), 2);
        assert_eq!(
            values[0],
            Value::from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_other_backends_repeat_values() {
        let (sql, values) = bind_named(
            DbBackend::MySql,
            "a >= :beginDate AND b >= :beginDate",
            &params(),
        )
        .unwrap();
        assert_eq!(sql, "a >= ? AND b >= ?");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_literals_and_casts_are_not_parameters() {
        let (sql, values) = bind_named(
            DbBackend::Postgres,
            "SELECT 'x:endDate', a::date, to_char(t, 'HH24:MI') FROM t WHERE b LIKE :pattern",
            &params(),
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT 'x:endDate', a::date, to_char(t, 'HH24:MI') FROM t WHERE b LIKE $1"
        );
        assert_eq!(values, vec![Value::from("TEST%".to_string())]);
    }

    #[test]
    fn test_unknown_parameter_is_an_error() {
        let err = bind_named(DbBackend::Postgres, "a = :missing", &params()).unwrap_err();
        assert!(matches!(err, ExecutorError::UnknownParameter(name) if name == "missing"));
    }

    #[test]
    fn test_executor_error_maps_to_query_execution() {
        let err: ReportError = ExecutorError::Database(DbErr::Custom("timeout".into())).into();
        assert!(matches!(err, ReportError::QueryExecution(message) if message.contains("timeout")));
    }
}

//! rusqlite-backed implementation of [`Backend`].

use std::path::Path;

use rusqlite::Connection;
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqliteValue, ValueRef};
use tracing::debug;

use crate::backend::Backend;
use crate::error::OrmResult;
use crate::params::Params;
use crate::row::Row;
use crate::value::Value;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqliteValue::Null),
            Value::Integer(n) => ToSqlOutput::Owned(SqliteValue::Integer(*n)),
            Value::Real(r) => ToSqlOutput::Owned(SqliteValue::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl From<SqliteValue> for Value {
    fn from(value: SqliteValue) -> Self {
        match value {
            SqliteValue::Null => Value::Null,
            SqliteValue::Integer(n) => Value::Integer(n),
            SqliteValue::Real(r) => Value::Real(r),
            SqliteValue::Text(s) => Value::Text(s),
            SqliteValue::Blob(b) => Value::Blob(b),
        }
    }
}

/// A SQLite connection owned by one unit of work.
///
/// Statements are autocommitted; callers needing multi-statement atomicity
/// use the transaction passthroughs.
pub struct SqliteConnection {
    conn: Connection,
}

impl SqliteConnection {
    /// Open (creating if necessary) a database file.
    pub fn open(path: impl AsRef<Path>) -> OrmResult<Self> {
        Ok(Self {
            conn: Connection::open(path)?,
        })
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory() -> OrmResult<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Run a batch of semicolon-separated statements without parameters.
    /// Used for schema creation and migrations.
    pub fn execute_batch(&self, sql: &str) -> OrmResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn begin_transaction(&self) -> OrmResult<()> {
        self.execute_batch("BEGIN;")
    }

    pub fn commit(&self) -> OrmResult<()> {
        self.execute_batch("COMMIT;")
    }

    pub fn rollback(&self) -> OrmResult<()> {
        self.execute_batch("ROLLBACK;")
    }

    fn bind_args<'a>(params: &'a Params) -> Vec<(&'a str, &'a dyn ToSql)> {
        params
            .iter()
            .map(|(name, value)| (name, value as &dyn ToSql))
            .collect()
    }
}

impl Backend for SqliteConnection {
    fn query(&self, sql: &str, params: &Params) -> OrmResult<Vec<Row>> {
        debug!(target: "liteorm::sql", sql, params = params.len(), "query");
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let args = Self::bind_args(params);
        let mut rows = stmt.query(&args[..])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut mapped = Row::new();
            for (idx, column) in columns.iter().enumerate() {
                let value: SqliteValue = row.get(idx)?;
                mapped.insert(column.clone(), value.into());
            }
            out.push(mapped);
        }
        Ok(out)
    }

    fn execute(&self, sql: &str, params: &Params) -> OrmResult<u64> {
        debug!(target: "liteorm::sql", sql, params = params.len(), "execute");
        let mut stmt = self.conn.prepare(sql)?;
        let args = Self::bind_args(params);
        let affected = stmt.execute(&args[..])?;
        Ok(affected as u64)
    }

    fn insert(&self, sql: &str, params: &Params) -> OrmResult<i64> {
        debug!(target: "liteorm::sql", sql, params = params.len(), "insert");
        let mut stmt = self.conn.prepare(sql)?;
        let args = Self::bind_args(params);
        stmt.execute(&args[..])?;
        Ok(self.conn.last_insert_rowid())
    }
}

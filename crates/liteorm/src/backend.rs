//! Storage execution backend abstraction.

use crate::error::OrmResult;
use crate::params::Params;
use crate::row::Row;

/// A synchronous SQL execution backend.
///
/// The builder and record layers are written against this trait and receive a
/// backend handle explicitly at every entry point — there is no ambient
/// global connection. Statements arrive as rendered SQL text plus a named
/// parameter map; the backend is responsible for parameterized execution.
pub trait Backend {
    /// Run a read statement and return all rows in result order.
    fn query(&self, sql: &str, params: &Params) -> OrmResult<Vec<Row>>;

    /// Run a write statement and return the affected-row count.
    fn execute(&self, sql: &str, params: &Params) -> OrmResult<u64>;

    /// Run an insert statement and return the generated row identity.
    fn insert(&self, sql: &str, params: &Params) -> OrmResult<i64>;
}

impl<B: Backend> Backend for &B {
    fn query(&self, sql: &str, params: &Params) -> OrmResult<Vec<Row>> {
        (**self).query(sql, params)
    }

    fn execute(&self, sql: &str, params: &Params) -> OrmResult<u64> {
        (**self).execute(sql, params)
    }

    fn insert(&self, sql: &str, params: &Params) -> OrmResult<i64> {
        (**self).insert(sql, params)
    }
}

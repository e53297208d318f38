//! Fluent SQL query builder.
//!
//! A [`QueryBuilder`] accumulates the shape of exactly one statement and
//! renders it to SQL text plus a named parameter map. Chain methods consume
//! the builder; methods with statement-kind legality rules return
//! `OrmResult<Self>` and fail before anything is applied, so a builder is
//! never left in a half-applied state. Execution helpers borrow the builder
//! and an explicit [`Backend`] handle, leaving the builder reusable.
//!
//! ```ignore
//! let rows = QueryBuilder::table("users")
//!     .where_op("age", ">", 18)?
//!     .order_by("name", Order::Asc)?
//!     .limit(20)?
//!     .get(&db)?;
//! ```

use crate::backend::Backend;
use crate::error::{OrmError, OrmResult};
use crate::params::Params;
use crate::row::Row;
use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    fn name(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

/// Ordering direction for `ORDER BY` clauses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Connector {
    And,
    Or,
}

impl Connector {
    fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A single SQL statement under construction.
#[must_use]
#[derive(Clone, Debug)]
pub struct QueryBuilder {
    kind: StatementKind,
    table: Option<String>,
    /// Pre-rendered body for insert/update/delete statements.
    base: Option<String>,
    projection: Vec<String>,
    distinct: bool,
    joins: Vec<String>,
    predicates: Vec<(String, Connector)>,
    group_by: Vec<String>,
    having: Vec<String>,
    order_by: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    params: Params,
    counter: u32,
}

impl QueryBuilder {
    fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            table: None,
            base: None,
            projection: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            predicates: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            params: Params::new(),
            counter: 0,
        }
    }

    /// Start a SELECT statement over `table`, projecting all columns.
    pub fn table(table: &str) -> Self {
        let mut qb = Self::new(StatementKind::Select);
        qb.table = Some(table.to_string());
        qb
    }

    /// Start a SELECT statement over `table` with an explicit projection.
    pub fn select(table: &str, columns: &[&str]) -> Self {
        let mut qb = Self::table(table);
        qb.projection = columns.iter().map(|c| c.to_string()).collect();
        qb
    }

    /// Start an INSERT statement from a column→value map, binding one
    /// parameter per column in map order.
    pub fn insert(table: &str, data: &[(&str, Value)]) -> OrmResult<Self> {
        if data.is_empty() {
            return Err(OrmError::configuration(
                "INSERT requires at least one column",
            ));
        }
        let mut qb = Self::new(StatementKind::Insert);
        qb.table = Some(table.to_string());

        let mut columns = Vec::with_capacity(data.len());
        let mut placeholders = Vec::with_capacity(data.len());
        for (column, value) in data {
            let param = qb.next_param(column);
            qb.params.insert(param.clone(), value.clone());
            columns.push(*column);
            placeholders.push(param);
        }
        qb.base = Some(format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        ));
        Ok(qb)
    }

    /// Start an UPDATE statement from a column→value map. `where_*` may be
    /// chained afterward to scope the affected rows.
    pub fn update(table: &str, data: &[(&str, Value)]) -> OrmResult<Self> {
        if data.is_empty() {
            return Err(OrmError::configuration("UPDATE requires a non-empty SET"));
        }
        let mut qb = Self::new(StatementKind::Update);
        qb.table = Some(table.to_string());

        let mut sets = Vec::with_capacity(data.len());
        for (column, value) in data {
            let param = qb.next_param(column);
            qb.params.insert(param.clone(), value.clone());
            sets.push(format!("{column} = {param}"));
        }
        qb.base = Some(format!("UPDATE {table} SET {}", sets.join(", ")));
        Ok(qb)
    }

    /// Start a DELETE statement. `where_*` may be chained afterward to scope
    /// the affected rows.
    pub fn delete(table: &str) -> Self {
        let mut qb = Self::new(StatementKind::Delete);
        qb.table = Some(table.to_string());
        qb.base = Some(format!("DELETE FROM {table}"));
        qb
    }

    /// Next unique placeholder for `field`: `:` + sanitized field name + `_` +
    /// monotonic counter. Names never collide within one statement.
    fn next_param(&mut self, field: &str) -> String {
        self.counter += 1;
        let sanitized: String = field
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!(":{}_{}", sanitized, self.counter)
    }

    fn ensure_predicates_allowed(&self) -> OrmResult<()> {
        match self.kind {
            StatementKind::Insert => Err(OrmError::configuration(
                "WHERE can only be added to SELECT, UPDATE or DELETE statements",
            )),
            _ => Ok(()),
        }
    }

    fn ensure_select(&self, clause: &str) -> OrmResult<()> {
        if self.kind == StatementKind::Select {
            Ok(())
        } else {
            Err(OrmError::configuration(format!(
                "{clause} is only valid on SELECT statements, not {}",
                self.kind.name()
            )))
        }
    }

    // ==================== Projection ====================

    /// Replace the projected columns (default is `*`).
    pub fn project(mut self, columns: &[&str]) -> OrmResult<Self> {
        self.ensure_select("column projection")?;
        self.projection = columns.iter().map(|c| c.to_string()).collect();
        Ok(self)
    }

    /// Append projected columns to the existing projection.
    pub fn add_projection(mut self, columns: &[&str]) -> OrmResult<Self> {
        self.ensure_select("column projection")?;
        self.projection
            .extend(columns.iter().map(|c| c.to_string()));
        Ok(self)
    }

    /// Project distinct rows.
    pub fn distinct(mut self) -> OrmResult<Self> {
        self.ensure_select("DISTINCT")?;
        self.distinct = true;
        Ok(self)
    }

    // ==================== Predicates ====================

    fn push_where(
        mut self,
        field: &str,
        operator: &str,
        value: Value,
        connector: Connector,
    ) -> OrmResult<Self> {
        self.ensure_predicates_allowed()?;
        let param = self.next_param(field);
        let clause = format!("{field} {operator} {param}");
        self.params.insert(param, value);
        self.predicates.push((clause, connector));
        Ok(self)
    }

    /// Add `field = value`, AND-connected.
    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> OrmResult<Self> {
        self.push_where(field, "=", value.into(), Connector::And)
    }

    /// Add `field <operator> value`, AND-connected.
    pub fn where_op(self, field: &str, operator: &str, value: impl Into<Value>) -> OrmResult<Self> {
        self.push_where(field, operator, value.into(), Connector::And)
    }

    /// Add `field = value`, OR-connected.
    pub fn or_where_eq(self, field: &str, value: impl Into<Value>) -> OrmResult<Self> {
        self.push_where(field, "=", value.into(), Connector::Or)
    }

    /// Add `field <operator> value`, OR-connected.
    pub fn or_where_op(
        self,
        field: &str,
        operator: &str,
        value: impl Into<Value>,
    ) -> OrmResult<Self> {
        self.push_where(field, operator, value.into(), Connector::Or)
    }

    /// Add one equality predicate per pair, all AND-connected. The whole map
    /// is applied atomically: an illegal statement kind fails before any
    /// predicate is added.
    pub fn where_all(mut self, conditions: &[(&str, Value)]) -> OrmResult<Self> {
        self.ensure_predicates_allowed()?;
        for (field, value) in conditions {
            self = self.push_where(field, "=", value.clone(), Connector::And)?;
        }
        Ok(self)
    }

    /// Add `field LIKE pattern`, AND-connected.
    pub fn where_like(self, field: &str, pattern: &str) -> OrmResult<Self> {
        self.push_where(field, "LIKE", pattern.into(), Connector::And)
    }

    /// Add `field LIKE pattern`, OR-connected.
    pub fn or_where_like(self, field: &str, pattern: &str) -> OrmResult<Self> {
        self.push_where(field, "LIKE", pattern.into(), Connector::Or)
    }

    fn push_where_in(
        mut self,
        field: &str,
        values: &[Value],
        negated: bool,
        connector: Connector,
    ) -> OrmResult<Self> {
        self.ensure_predicates_allowed()?;
        // An empty list would render invalid `IN ()` SQL; leave the builder
        // unchanged instead.
        if values.is_empty() {
            return Ok(self);
        }
        let mut placeholders = Vec::with_capacity(values.len());
        for value in values {
            let param = self.next_param(field);
            self.params.insert(param.clone(), value.clone());
            placeholders.push(param);
        }
        let operator = if negated { "NOT IN" } else { "IN" };
        let clause = format!("{field} {operator} ({})", placeholders.join(", "));
        self.predicates.push((clause, connector));
        Ok(self)
    }

    /// Add `field IN (values...)`; no-op on an empty list.
    pub fn where_in(self, field: &str, values: &[Value]) -> OrmResult<Self> {
        self.push_where_in(field, values, false, Connector::And)
    }

    /// Add `field NOT IN (values...)`; no-op on an empty list.
    pub fn where_not_in(self, field: &str, values: &[Value]) -> OrmResult<Self> {
        self.push_where_in(field, values, true, Connector::And)
    }

    /// OR-connected variant of [`where_in`](Self::where_in).
    pub fn or_where_in(self, field: &str, values: &[Value]) -> OrmResult<Self> {
        self.push_where_in(field, values, false, Connector::Or)
    }

    /// OR-connected variant of [`where_not_in`](Self::where_not_in).
    pub fn or_where_not_in(self, field: &str, values: &[Value]) -> OrmResult<Self> {
        self.push_where_in(field, values, true, Connector::Or)
    }

    fn push_where_null(
        mut self,
        field: &str,
        negated: bool,
        connector: Connector,
    ) -> OrmResult<Self> {
        self.ensure_predicates_allowed()?;
        let clause = if negated {
            format!("{field} IS NOT NULL")
        } else {
            format!("{field} IS NULL")
        };
        self.predicates.push((clause, connector));
        Ok(self)
    }

    /// Add `field IS NULL` (no bound parameter).
    pub fn where_null(self, field: &str) -> OrmResult<Self> {
        self.push_where_null(field, false, Connector::And)
    }

    /// Add `field IS NOT NULL` (no bound parameter).
    pub fn where_not_null(self, field: &str) -> OrmResult<Self> {
        self.push_where_null(field, true, Connector::And)
    }

    /// OR-connected variant of [`where_null`](Self::where_null).
    pub fn or_where_null(self, field: &str) -> OrmResult<Self> {
        self.push_where_null(field, false, Connector::Or)
    }

    /// OR-connected variant of [`where_not_null`](Self::where_not_null).
    pub fn or_where_not_null(self, field: &str) -> OrmResult<Self> {
        self.push_where_null(field, true, Connector::Or)
    }

    fn push_where_between(
        mut self,
        field: &str,
        low: Value,
        high: Value,
        negated: bool,
        connector: Connector,
    ) -> OrmResult<Self> {
        self.ensure_predicates_allowed()?;
        let low_param = self.next_param(field);
        let high_param = self.next_param(field);
        self.params.insert(low_param.clone(), low);
        self.params.insert(high_param.clone(), high);
        let operator = if negated { "NOT BETWEEN" } else { "BETWEEN" };
        let clause = format!("{field} {operator} {low_param} AND {high_param}");
        self.predicates.push((clause, connector));
        Ok(self)
    }

    /// Add `field BETWEEN low AND high` (exactly two bound parameters).
    pub fn where_between(
        self,
        field: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> OrmResult<Self> {
        self.push_where_between(field, low.into(), high.into(), false, Connector::And)
    }

    /// Add `field NOT BETWEEN low AND high`.
    pub fn where_not_between(
        self,
        field: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> OrmResult<Self> {
        self.push_where_between(field, low.into(), high.into(), true, Connector::And)
    }

    /// OR-connected variant of [`where_between`](Self::where_between).
    pub fn or_where_between(
        self,
        field: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> OrmResult<Self> {
        self.push_where_between(field, low.into(), high.into(), false, Connector::Or)
    }

    /// OR-connected variant of [`where_not_between`](Self::where_not_between).
    pub fn or_where_not_between(
        self,
        field: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> OrmResult<Self> {
        self.push_where_between(field, low.into(), high.into(), true, Connector::Or)
    }

    /// Add `DATE(field) <operator> value`, AND-connected.
    pub fn where_date(
        mut self,
        field: &str,
        operator: &str,
        value: impl Into<Value>,
    ) -> OrmResult<Self> {
        self.ensure_predicates_allowed()?;
        let param = self.next_param(field);
        let clause = format!("DATE({field}) {operator} {param}");
        self.params.insert(param, value.into());
        self.predicates.push((clause, Connector::And));
        Ok(self)
    }

    /// Apply `f` to the builder only when `condition` holds.
    pub fn when<F>(self, condition: bool, f: F) -> OrmResult<Self>
    where
        F: FnOnce(Self) -> OrmResult<Self>,
    {
        if condition { f(self) } else { Ok(self) }
    }

    // ==================== Joins ====================

    fn push_join(
        mut self,
        kind: &str,
        table: &str,
        left: &str,
        operator: &str,
        right: &str,
    ) -> OrmResult<Self> {
        self.ensure_select("JOIN")?;
        self.joins
            .push(format!("{kind} JOIN {table} ON {left} {operator} {right}"));
        Ok(self)
    }

    /// Add an INNER JOIN. Join clauses render before WHERE, in call order.
    pub fn join(self, table: &str, left: &str, operator: &str, right: &str) -> OrmResult<Self> {
        self.push_join("INNER", table, left, operator, right)
    }

    /// Add a LEFT JOIN.
    pub fn left_join(
        self,
        table: &str,
        left: &str,
        operator: &str,
        right: &str,
    ) -> OrmResult<Self> {
        self.push_join("LEFT", table, left, operator, right)
    }

    // ==================== Ordering & grouping ====================

    /// Append an `ORDER BY` entry.
    pub fn order_by(mut self, column: &str, order: Order) -> OrmResult<Self> {
        self.ensure_select("ORDER BY")?;
        self.order_by.push(format!("{column} {}", order.as_str()));
        Ok(self)
    }

    /// Append `ORDER BY column DESC`.
    pub fn order_by_desc(self, column: &str) -> OrmResult<Self> {
        self.order_by(column, Order::Desc)
    }

    /// Order by `created_at DESC`.
    pub fn latest(self) -> OrmResult<Self> {
        self.order_by("created_at", Order::Desc)
    }

    /// Order by `created_at ASC`.
    pub fn oldest(self) -> OrmResult<Self> {
        self.order_by("created_at", Order::Asc)
    }

    /// Order rows randomly. The `RANDOM()` fragment is developer-supplied
    /// SQL, not user data.
    pub fn in_random_order(mut self) -> OrmResult<Self> {
        self.ensure_select("ORDER BY")?;
        self.order_by.push("RANDOM()".to_string());
        Ok(self)
    }

    /// Append a `GROUP BY` entry.
    pub fn group_by(mut self, column: &str) -> OrmResult<Self> {
        self.ensure_select("GROUP BY")?;
        self.group_by.push(column.to_string());
        Ok(self)
    }

    /// Append a `HAVING` clause (AND-joined at render) with a bound value.
    pub fn having(
        mut self,
        field: &str,
        operator: &str,
        value: impl Into<Value>,
    ) -> OrmResult<Self> {
        self.ensure_select("HAVING")?;
        let param = self.next_param(field);
        self.having.push(format!("{field} {operator} {param}"));
        self.params.insert(param, value.into());
        Ok(self)
    }

    /// Set the row limit, overriding any previous value. Only valid on
    /// SELECT statements.
    pub fn limit(mut self, n: u64) -> OrmResult<Self> {
        self.ensure_select("LIMIT")?;
        self.limit = Some(n);
        Ok(self)
    }

    /// Set the row offset, overriding any previous value. Only valid on
    /// SELECT statements.
    pub fn offset(mut self, n: u64) -> OrmResult<Self> {
        self.ensure_select("OFFSET")?;
        self.offset = Some(n);
        Ok(self)
    }

    // ==================== Rendering ====================

    fn render_where(&self, sql: &mut String) {
        if self.predicates.is_empty() {
            return;
        }
        sql.push_str(" WHERE ");
        for (i, (clause, connector)) in self.predicates.iter().enumerate() {
            if i > 0 {
                sql.push_str(connector.as_str());
                sql.push(' ');
            }
            sql.push_str(clause);
            if i + 1 < self.predicates.len() {
                sql.push(' ');
            }
        }
    }

    fn render_with_limit(&self, limit: Option<u64>) -> String {
        let mut sql = match self.kind {
            StatementKind::Select => {
                let table = self.table.as_deref().unwrap_or_default();
                let projection = if self.projection.is_empty() {
                    "*".to_string()
                } else {
                    self.projection.join(", ")
                };
                let distinct = if self.distinct { "DISTINCT " } else { "" };
                let mut sql = format!("SELECT {distinct}{projection} FROM {table}");
                for join in &self.joins {
                    sql.push(' ');
                    sql.push_str(join);
                }
                sql
            }
            _ => self.base.clone().unwrap_or_default(),
        };

        self.render_where(&mut sql);

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&self.having.join(" AND "));
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.join(", "));
        }
        // SQLite only accepts OFFSET after a LIMIT; -1 means "no limit".
        match (limit, self.offset) {
            (Some(n), _) => sql.push_str(&format!(" LIMIT {n}")),
            (None, Some(_)) => sql.push_str(" LIMIT -1"),
            (None, None) => {}
        }
        if let Some(n) = self.offset {
            sql.push_str(&format!(" OFFSET {n}"));
        }

        sql.push(';');
        sql
    }

    /// Render the statement to SQL text. Pure and repeatable; the clause
    /// order is base → WHERE → GROUP BY → HAVING → ORDER BY → LIMIT → OFFSET.
    pub fn render(&self) -> String {
        self.render_with_limit(self.limit)
    }

    /// The bound parameter map. Its placeholder names correspond 1:1 with the
    /// placeholders appearing in [`render`](Self::render) output.
    pub fn parameters(&self) -> &Params {
        &self.params
    }

    // ==================== Read execution ====================

    /// Execute and return all rows.
    pub fn get(&self, db: &impl Backend) -> OrmResult<Vec<Row>> {
        self.ensure_select("get")?;
        db.query(&self.render(), &self.params)
    }

    /// Execute with the limit temporarily forced to 1 and return the first
    /// row, if any. The builder's own limit is untouched.
    pub fn first(&self, db: &impl Backend) -> OrmResult<Option<Row>> {
        self.ensure_select("first")?;
        let rows = db.query(&self.render_with_limit(Some(1)), &self.params)?;
        Ok(rows.into_iter().next())
    }

    /// Like [`first`](Self::first), but a missing row is a `NotFound` error.
    pub fn first_or_fail(&self, db: &impl Backend) -> OrmResult<Row> {
        self.first(db)?.ok_or_else(|| {
            OrmError::not_found(format!(
                "no rows in {}",
                self.table.as_deref().unwrap_or("query")
            ))
        })
    }

    /// Fetch a single row by its `id` column.
    pub fn find(&self, db: &impl Backend, id: i64) -> OrmResult<Option<Row>> {
        self.clone().where_eq("id", id)?.first(db)
    }

    /// Like [`find`](Self::find), but a missing row is a `NotFound` error.
    pub fn find_or_fail(&self, db: &impl Backend, id: i64) -> OrmResult<Row> {
        self.find(db, id)?.ok_or_else(|| {
            OrmError::not_found(format!(
                "no row with id {id} in {}",
                self.table.as_deref().unwrap_or("query")
            ))
        })
    }

    /// Fetch the first row's value for a single column.
    pub fn value(&self, db: &impl Backend, column: &str) -> OrmResult<Option<Value>> {
        let qb = self.clone().project(&[column])?;
        Ok(qb
            .first(db)?
            .and_then(|row| row.iter().next().map(|(_, v)| v.clone())))
    }

    /// Fetch a single column across all rows.
    pub fn pluck(&self, db: &impl Backend, column: &str) -> OrmResult<Vec<Value>> {
        let qb = self.clone().project(&[column])?;
        let rows = qb.get(db)?;
        Ok(rows
            .iter()
            .filter_map(|row| row.iter().next().map(|(_, v)| v.clone()))
            .collect())
    }

    // ==================== Aggregates ====================

    /// Run an aggregate over a clone with the projection swapped; the
    /// original builder stays untouched and reusable.
    fn aggregate(&self, db: &impl Backend, function: &str, column: &str) -> OrmResult<Value> {
        self.ensure_select("aggregate")?;
        let mut qb = self.clone();
        qb.projection = vec![format!("{function}({column}) AS aggregate")];
        let rows = db.query(&qb.render(), &qb.params)?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.get("aggregate").cloned())
            .unwrap_or(Value::Null))
    }

    /// `COUNT(*)` over the current statement shape.
    pub fn count(&self, db: &impl Backend) -> OrmResult<i64> {
        Ok(self
            .aggregate(db, "COUNT", "*")?
            .as_i64()
            .unwrap_or_default())
    }

    /// `MAX(column)`; `Null` when there are no rows.
    pub fn max(&self, db: &impl Backend, column: &str) -> OrmResult<Value> {
        self.aggregate(db, "MAX", column)
    }

    /// `MIN(column)`; `Null` when there are no rows.
    pub fn min(&self, db: &impl Backend, column: &str) -> OrmResult<Value> {
        self.aggregate(db, "MIN", column)
    }

    /// `AVG(column)`; `Null` when there are no rows.
    pub fn avg(&self, db: &impl Backend, column: &str) -> OrmResult<Value> {
        self.aggregate(db, "AVG", column)
    }

    /// `SUM(column)`; `Null` when there are no rows.
    pub fn sum(&self, db: &impl Backend, column: &str) -> OrmResult<Value> {
        self.aggregate(db, "SUM", column)
    }

    /// Whether any row matches the current statement shape.
    pub fn exists(&self, db: &impl Backend) -> OrmResult<bool> {
        Ok(self.count(db)? > 0)
    }

    /// Whether no row matches the current statement shape.
    pub fn doesnt_exist(&self, db: &impl Backend) -> OrmResult<bool> {
        Ok(!self.exists(db)?)
    }

    // ==================== Mutating execution ====================

    fn table_for(&self, operation: &str) -> OrmResult<&str> {
        self.table
            .as_deref()
            .ok_or_else(|| OrmError::configuration(format!("table must be set before {operation}")))
    }

    fn ensure_plain_filter(&self, operation: &str) -> OrmResult<()> {
        if !self.group_by.is_empty()
            || !self.having.is_empty()
            || !self.order_by.is_empty()
            || self.limit.is_some()
            || self.offset.is_some()
        {
            return Err(OrmError::configuration(format!(
                "{operation} only supports WHERE clauses",
            )));
        }
        Ok(())
    }

    /// Insert a column→value map into the builder's table and return the
    /// generated row identity. Requires a table to have been set.
    pub fn insert_data(&self, db: &impl Backend, data: &[(&str, Value)]) -> OrmResult<i64> {
        let table = self.table_for("insert")?;
        QueryBuilder::insert(table, data)?.execute_returning_id(db)
    }

    /// Update the builder's table with a column→value map, scoped by any
    /// predicates already chained. Returns the affected-row count.
    pub fn update_data(&self, db: &impl Backend, data: &[(&str, Value)]) -> OrmResult<u64> {
        let table = self.table_for("update")?.to_string();
        self.ensure_plain_filter("update_data")?;
        if data.is_empty() {
            return Err(OrmError::configuration("UPDATE requires a non-empty SET"));
        }

        let mut qb = self.clone();
        let mut sets = Vec::with_capacity(data.len());
        for (column, value) in data {
            let param = qb.next_param(column);
            qb.params.insert(param.clone(), value.clone());
            sets.push(format!("{column} = {param}"));
        }

        let mut sql = format!("UPDATE {table} SET {}", sets.join(", "));
        qb.render_where(&mut sql);
        sql.push(';');
        db.execute(&sql, &qb.params)
    }

    /// Delete from the builder's table, scoped by any predicates already
    /// chained. Returns the affected-row count.
    pub fn delete_data(&self, db: &impl Backend) -> OrmResult<u64> {
        let table = self.table_for("delete")?;
        self.ensure_plain_filter("delete_data")?;

        let mut sql = format!("DELETE FROM {table}");
        self.render_where(&mut sql);
        sql.push(';');
        db.execute(&sql, &self.params)
    }

    /// Execute a directly-built INSERT/UPDATE/DELETE statement and return the
    /// affected-row count.
    pub fn execute(&self, db: &impl Backend) -> OrmResult<u64> {
        if self.kind == StatementKind::Select {
            return Err(OrmError::configuration(
                "execute is only valid for INSERT, UPDATE or DELETE statements; use get",
            ));
        }
        db.execute(&self.render(), &self.params)
    }

    /// Execute a directly-built INSERT statement and return the generated
    /// row identity.
    pub fn execute_returning_id(&self, db: &impl Backend) -> OrmResult<i64> {
        if self.kind != StatementKind::Insert {
            return Err(OrmError::configuration(
                "execute_returning_id is only valid for INSERT statements",
            ));
        }
        db.insert(&self.render(), &self.params)
    }
}

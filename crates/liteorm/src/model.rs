//! ActiveRecord base: the [`Record`] contract plus generic persistence.
//!
//! A concrete entity type implements [`Record`] — table name, declared
//! columns, identity, explicit attribute dispatch and a pure validation hook
//! — and receives every CRUD operation through the blanket [`ActiveRecord`]
//! impl. All operations take the storage handle explicitly; there is no
//! ambient connection.
//!
//! ```ignore
//! #[derive(Default)]
//! struct Problem {
//!     id: Option<i64>,
//!     title: Option<String>,
//!     errors: Errors,
//! }
//!
//! impl Record for Problem {
//!     const TABLE: &'static str = "problems";
//!     const COLUMNS: &'static [&'static str] = &["title"];
//!     // id/attribute/errors accessors, validate() ...
//! }
//!
//! let mut problem = Problem { title: Some("X".into()), ..Default::default() };
//! if problem.save(&db)? {
//!     let found = Problem::find_by_id(&db, problem.id().unwrap())?;
//! }
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::backend::Backend;
use crate::builder::QueryBuilder;
use crate::error::{OrmError, OrmResult};
use crate::paginator::Paginator;
use crate::relations::{BelongsTo, BelongsToMany, HasMany};
use crate::row::Row;
use crate::value::Value;

/// Per-field validation messages, cleared and repopulated on every
/// validation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Errors {
    messages: BTreeMap<String, String>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field, replacing any earlier one.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.messages.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.messages.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

/// The per-entity configuration and state contract.
///
/// Attribute dispatch is explicit: each type matches on its own declared
/// column names and maps them onto typed fields. Unknown names are
/// [`OrmError::UnknownAttribute`].
pub trait Record {
    /// Table backing this entity type.
    const TABLE: &'static str;

    /// Declared column names. The identity column is implicit and always
    /// projected alongside these.
    const COLUMNS: &'static [&'static str];

    /// Identity; `None` marks a new, unpersisted record.
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: Option<i64>);

    /// Read a declared column as a [`Value`].
    fn attribute(&self, column: &str) -> OrmResult<Value>;

    /// Write a declared column from a [`Value`].
    fn set_attribute(&mut self, column: &str, value: Value) -> OrmResult<()>;

    fn errors(&self) -> &Errors;

    fn errors_mut(&mut self) -> &mut Errors;

    /// Validation hook; push failures into `errors_mut()`. Pure and
    /// in-memory — it never touches storage.
    fn validate(&mut self) {}
}

/// Generic persistence over any [`Record`] type, implemented via the query
/// builder. Blanket-implemented; entity types only supply [`Record`].
pub trait ActiveRecord: Record + Default + Sized {
    /// Projected columns for finders: identity plus the declared columns.
    fn projection() -> Vec<&'static str> {
        std::iter::once("id").chain(Self::COLUMNS.iter().copied()).collect()
    }

    /// Construct a record from a raw row: every declared column starts at its
    /// null/absent default, then each row column is applied in order. A row
    /// carrying an `id` yields a hydrated (persisted) record.
    fn materialize(row: &Row) -> OrmResult<Self> {
        let mut record = Self::default();
        for (column, value) in row.iter() {
            if column == "id" {
                record.set_id(value.clone().decode("id")?);
            } else {
                record.set_attribute(column, value.clone())?;
            }
        }
        Ok(record)
    }

    /// True until the record has been persisted.
    fn new_record(&self) -> bool {
        self.id().is_none()
    }

    /// Clear previous errors, run the validation hook, report success.
    fn is_valid(&mut self) -> bool {
        self.errors_mut().clear();
        self.validate();
        self.errors().is_empty()
    }

    fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// Current declared-column values as a column→value map.
    fn attribute_pairs(&self) -> OrmResult<Vec<(&'static str, Value)>> {
        Self::COLUMNS
            .iter()
            .map(|column| Ok((*column, self.attribute(column)?)))
            .collect()
    }

    /// Validate, then insert (adopting the generated identity) or update the
    /// row matching the identity. Returns `Ok(false)` when validation fails
    /// (errors populated) or when an update matches no row — e.g. the row was
    /// deleted underneath us.
    fn save(&mut self, db: &impl Backend) -> OrmResult<bool> {
        if !self.is_valid() {
            return Ok(false);
        }
        let data = self.attribute_pairs()?;
        match self.id() {
            None => {
                let id = QueryBuilder::insert(Self::TABLE, &data)?.execute_returning_id(db)?;
                self.set_id(Some(id));
                Ok(true)
            }
            Some(id) => {
                let affected = QueryBuilder::update(Self::TABLE, &data)?
                    .where_eq("id", id)?
                    .execute(db)?;
                Ok(affected > 0)
            }
        }
    }

    /// Merge `changes` into the record and persist through the update path,
    /// bypassing validation. Callers wanting validation run `is_valid` first.
    fn update(&mut self, db: &impl Backend, changes: &[(&str, Value)]) -> OrmResult<bool> {
        let Some(id) = self.id() else {
            return Err(OrmError::configuration("cannot update an unsaved record"));
        };
        for (column, value) in changes {
            self.set_attribute(column, value.clone())?;
        }
        let data = self.attribute_pairs()?;
        let affected = QueryBuilder::update(Self::TABLE, &data)?
            .where_eq("id", id)?
            .execute(db)?;
        Ok(affected > 0)
    }

    /// Delete the row matching the identity. Returns whether a row was
    /// actually removed; the in-memory record keeps its state.
    fn destroy(&self, db: &impl Backend) -> OrmResult<bool> {
        let Some(id) = self.id() else {
            return Err(OrmError::configuration("cannot destroy an unsaved record"));
        };
        let affected = QueryBuilder::delete(Self::TABLE)
            .where_eq("id", id)?
            .execute(db)?;
        Ok(affected > 0)
    }

    fn find_by_id(db: &impl Backend, id: i64) -> OrmResult<Option<Self>> {
        QueryBuilder::select(Self::TABLE, &Self::projection())
            .where_eq("id", id)?
            .first(db)?
            .map(|row| Self::materialize(&row))
            .transpose()
    }

    fn find_by_id_or_fail(db: &impl Backend, id: i64) -> OrmResult<Self> {
        Self::find_by_id(db, id)?
            .ok_or_else(|| OrmError::not_found(format!("no {} with id {id}", Self::TABLE)))
    }

    fn all(db: &impl Backend) -> OrmResult<Vec<Self>> {
        QueryBuilder::select(Self::TABLE, &Self::projection())
            .get(db)?
            .iter()
            .map(Self::materialize)
            .collect()
    }

    /// All records matching the field→value equality pairs (AND-connected).
    fn filter(db: &impl Backend, conditions: &[(&str, Value)]) -> OrmResult<Vec<Self>> {
        QueryBuilder::select(Self::TABLE, &Self::projection())
            .where_all(conditions)?
            .get(db)?
            .iter()
            .map(Self::materialize)
            .collect()
    }

    /// First record matching the conditions, or `None`.
    fn find_by(db: &impl Backend, conditions: &[(&str, Value)]) -> OrmResult<Option<Self>> {
        QueryBuilder::select(Self::TABLE, &Self::projection())
            .where_all(conditions)?
            .first(db)?
            .map(|row| Self::materialize(&row))
            .transpose()
    }

    /// Whether any record matches the conditions.
    fn exists(db: &impl Backend, conditions: &[(&str, Value)]) -> OrmResult<bool> {
        QueryBuilder::table(Self::TABLE)
            .where_all(conditions)?
            .exists(db)
    }

    /// Page descriptor over the whole table.
    fn paginate(db: &impl Backend, page: u64, per_page: u64) -> OrmResult<Paginator<Self>> {
        Paginator::new(db, page, per_page)
    }

    /// Fresh resolver for a parent this record points at via `foreign_key`.
    fn belongs_to<R: ActiveRecord>(&self, foreign_key: &'static str) -> BelongsTo<'_, Self, R> {
        BelongsTo::new(self, foreign_key)
    }

    /// Fresh resolver for children whose `foreign_key` points at this record.
    fn has_many<R: ActiveRecord>(&self, foreign_key: &'static str) -> HasMany<'_, Self, R> {
        HasMany::new(self, foreign_key)
    }

    /// Fresh resolver for a many-to-many association through `pivot_table`.
    fn belongs_to_many<R: ActiveRecord>(
        &self,
        pivot_table: &'static str,
        from_foreign_key: &'static str,
        to_foreign_key: &'static str,
    ) -> BelongsToMany<'_, Self, R> {
        BelongsToMany::new(self, pivot_table, from_foreign_key, to_foreign_key)
    }
}

impl<T: Record + Default> ActiveRecord for T {}

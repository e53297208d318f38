//! Relationship resolvers.
//!
//! Each resolver is an immutable descriptor created fresh on every access —
//! never cached — borrowing the owning record read-only. Repeated access
//! issues repeated queries; callers wanting memoization hold onto the
//! materialized results themselves.

use std::marker::PhantomData;

use crate::backend::Backend;
use crate::builder::QueryBuilder;
use crate::error::{OrmError, OrmResult};
use crate::model::{ActiveRecord, Record};
use crate::value::Value;

/// The owning record points at a single parent via a foreign key column.
pub struct BelongsTo<'a, O: Record, R: ActiveRecord> {
    owner: &'a O,
    foreign_key: &'static str,
    _related: PhantomData<R>,
}

impl<'a, O: Record, R: ActiveRecord> BelongsTo<'a, O, R> {
    pub(crate) fn new(owner: &'a O, foreign_key: &'static str) -> Self {
        Self {
            owner,
            foreign_key,
            _related: PhantomData,
        }
    }

    /// Fetch the parent by the owner's foreign key value. A null/absent
    /// foreign key or a missing parent row yields `None`.
    pub fn get(&self, db: &impl Backend) -> OrmResult<Option<R>> {
        let foreign_key_value = self.owner.attribute(self.foreign_key)?;
        if foreign_key_value.is_null() {
            return Ok(None);
        }
        QueryBuilder::select(R::TABLE, &R::projection())
            .where_eq("id", foreign_key_value)?
            .first(db)?
            .map(|row| R::materialize(&row))
            .transpose()
    }
}

/// The related table carries a foreign key pointing back at the owner.
pub struct HasMany<'a, O: Record, R: ActiveRecord> {
    owner: &'a O,
    foreign_key: &'static str,
    _related: PhantomData<R>,
}

impl<'a, O: Record, R: ActiveRecord> HasMany<'a, O, R> {
    pub(crate) fn new(owner: &'a O, foreign_key: &'static str) -> Self {
        Self {
            owner,
            foreign_key,
            _related: PhantomData,
        }
    }

    /// All children whose foreign key equals the owner's identity. An
    /// unsaved owner has no children.
    pub fn get(&self, db: &impl Backend) -> OrmResult<Vec<R>> {
        let Some(owner_id) = self.owner.id() else {
            return Ok(Vec::new());
        };
        QueryBuilder::select(R::TABLE, &R::projection())
            .where_eq(self.foreign_key, owner_id)?
            .get(db)?
            .iter()
            .map(R::materialize)
            .collect()
    }

    /// Number of children, counted without materializing them.
    pub fn count(&self, db: &impl Backend) -> OrmResult<i64> {
        let Some(owner_id) = self.owner.id() else {
            return Ok(0);
        };
        QueryBuilder::table(R::TABLE)
            .where_eq(self.foreign_key, owner_id)?
            .count(db)
    }

    /// A new, unpersisted child with the foreign key pre-populated from the
    /// owner's identity.
    pub fn build(&self) -> OrmResult<R> {
        let Some(owner_id) = self.owner.id() else {
            return Err(OrmError::configuration(
                "cannot build a child record for an unsaved owner",
            ));
        };
        let mut child = R::default();
        child.set_attribute(self.foreign_key, Value::Integer(owner_id))?;
        Ok(child)
    }
}

/// Many-to-many association through a pivot table.
pub struct BelongsToMany<'a, O: Record, R: ActiveRecord> {
    owner: &'a O,
    pivot_table: &'static str,
    from_foreign_key: &'static str,
    to_foreign_key: &'static str,
    _related: PhantomData<R>,
}

impl<'a, O: Record, R: ActiveRecord> BelongsToMany<'a, O, R> {
    pub(crate) fn new(
        owner: &'a O,
        pivot_table: &'static str,
        from_foreign_key: &'static str,
        to_foreign_key: &'static str,
    ) -> Self {
        Self {
            owner,
            pivot_table,
            from_foreign_key,
            to_foreign_key,
            _related: PhantomData,
        }
    }

    /// Related table joined to the pivot on the "to" key, filtered on the
    /// pivot "from" key. Shared by `get` and `count` so the two always agree.
    fn base_query(&self, owner_id: i64) -> OrmResult<QueryBuilder> {
        QueryBuilder::table(R::TABLE)
            .join(
                self.pivot_table,
                &format!("{}.id", R::TABLE),
                "=",
                &format!("{}.{}", self.pivot_table, self.to_foreign_key),
            )?
            .where_eq(
                &format!("{}.{}", self.pivot_table, self.from_foreign_key),
                owner_id,
            )
    }

    /// All related records for the owner. The projection is qualified with
    /// the related table name so same-named pivot columns cannot shadow it.
    pub fn get(&self, db: &impl Backend) -> OrmResult<Vec<R>> {
        let Some(owner_id) = self.owner.id() else {
            return Ok(Vec::new());
        };
        let qualified: Vec<String> = R::projection()
            .iter()
            .map(|column| format!("{}.{}", R::TABLE, column))
            .collect();
        let projection: Vec<&str> = qualified.iter().map(String::as_str).collect();

        self.base_query(owner_id)?
            .project(&projection)?
            .get(db)?
            .iter()
            .map(R::materialize)
            .collect()
    }

    /// Row count through the same join/filter shape as `get`.
    pub fn count(&self, db: &impl Backend) -> OrmResult<i64> {
        let Some(owner_id) = self.owner.id() else {
            return Ok(0);
        };
        self.base_query(owner_id)?.count(db)
    }
}

//! # liteorm
//!
//! A lightweight ActiveRecord-style SQLite ORM for Rust.
//!
//! ## Features
//!
//! - **Fluent query builder**: chainable SELECT/INSERT/UPDATE/DELETE
//!   construction rendering named-placeholder SQL plus a bound parameter map
//! - **Parameter safety**: every user-supplied value is bound, never
//!   interpolated into SQL text
//! - **ActiveRecord mapping**: entity types implement [`Record`] and receive
//!   CRUD, finders and pagination through the blanket [`ActiveRecord`] impl
//! - **Relationships**: `belongs_to`, `has_many` and `belongs_to_many`
//!   resolvers built on the same query builder
//! - **Explicit connections**: every operation takes a [`Backend`] handle;
//!   there is no global connection state
//!
//! ## Query builder
//!
//! ```ignore
//! use liteorm::{Order, QueryBuilder, SqliteConnection};
//!
//! let db = SqliteConnection::open("app.db")?;
//!
//! // SELECT
//! let rows = QueryBuilder::table("users")
//!     .where_eq("status", "active")?
//!     .order_by("created_at", Order::Desc)?
//!     .limit(10)?
//!     .get(&db)?;
//!
//! // INSERT
//! let id = QueryBuilder::table("users")
//!     .insert_data(&db, &[("name", "alice".into()), ("email", "a@example.com".into())])?;
//!
//! // UPDATE
//! QueryBuilder::table("users")
//!     .where_eq("id", id)?
//!     .update_data(&db, &[("status", "inactive".into())])?;
//!
//! // DELETE
//! QueryBuilder::table("users")
//!     .where_eq("id", id)?
//!     .delete_data(&db)?;
//! ```

pub mod backend;
pub mod builder;
pub mod error;
pub mod model;
pub mod paginator;
pub mod params;
pub mod relations;
pub mod row;
pub mod sqlite;
pub mod validations;
pub mod value;

pub use backend::Backend;
pub use builder::{Order, QueryBuilder};
pub use error::{OrmError, OrmResult};
pub use model::{ActiveRecord, Errors, Record};
pub use paginator::Paginator;
pub use params::Params;
pub use relations::{BelongsTo, BelongsToMany, HasMany};
pub use row::Row;
pub use sqlite::SqliteConnection;
pub use value::{FromValue, Value};

#[cfg(test)]
mod tests;

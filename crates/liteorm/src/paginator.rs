//! Offset-based page descriptor over a record type.

use crate::backend::Backend;
use crate::builder::QueryBuilder;
use crate::error::{OrmError, OrmResult};
use crate::model::ActiveRecord;

/// One page of records plus the totals needed to render navigation.
///
/// Computed eagerly from a row count and an offset-limited fetch; the
/// descriptor itself never touches storage again.
#[derive(Clone, Debug)]
pub struct Paginator<T> {
    page: u64,
    per_page: u64,
    total_records: u64,
    total_pages: u64,
    offset: u64,
    records: Vec<T>,
}

impl<T: ActiveRecord> Paginator<T> {
    /// Load page `page` (1-based) with `per_page` records per page.
    pub fn new(db: &impl Backend, page: u64, per_page: u64) -> OrmResult<Self> {
        if page < 1 {
            return Err(OrmError::configuration("page must be >= 1"));
        }
        if per_page < 1 {
            return Err(OrmError::configuration("per_page must be >= 1"));
        }

        let total_records = QueryBuilder::table(T::TABLE).count(db)? as u64;
        let total_pages = total_records.div_ceil(per_page);
        let offset = per_page * (page - 1);

        let records = QueryBuilder::select(T::TABLE, &T::projection())
            .limit(per_page)?
            .offset(offset)?
            .get(db)?
            .iter()
            .map(T::materialize)
            .collect::<OrmResult<Vec<T>>>()?;

        Ok(Self {
            page,
            per_page,
            total_records,
            total_pages,
            offset,
            records,
        })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn total_records(&self) -> u64 {
        self.total_records
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Number of records actually on this page.
    pub fn records_on_page(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn previous_page(&self) -> u64 {
        self.page.saturating_sub(1)
    }

    pub fn next_page(&self) -> u64 {
        self.page + 1
    }

    pub fn has_previous_page(&self) -> bool {
        self.previous_page() >= 1
    }

    pub fn has_next_page(&self) -> bool {
        self.next_page() <= self.total_pages
    }

    pub fn is_page(&self, page: u64) -> bool {
        self.page == page
    }

    /// Human-readable range summary, e.g. `Showing 6 - 10 of 11`.
    pub fn entries_info(&self) -> String {
        let begin = self.offset + 1;
        let end = self.offset + self.records_on_page();
        format!("Showing {begin} - {end} of {}", self.total_records)
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

//! Data access over sea-orm. Repositories borrow any `ConnectionTrait`, so the
//! same code runs on the pool or inside a transaction.

pub mod startups;
pub mod users;

pub use startups::{ListParams, StartupRepository, StartupWithFounders, UpsertOutcome};
pub use users::{UserFilter, UserRepository};

/// One page of results, with totals computed after filtering.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

pub(crate) fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        0
    } else {
        total.div_ceil(limit)
    }
}

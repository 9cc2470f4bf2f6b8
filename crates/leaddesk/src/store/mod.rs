//! Persistence contracts and the in-memory document store.
//!
//! The service talks to its store through two traits:
//!
//! - [`CounterStore`] exposes a single atomic find-and-modify-with-upsert used
//!   to allocate sequence values.
//! - [`LeadStore`] covers insert, lookup, listing, skip/limit/sort paging,
//!   partial update by ID and delete by ID.
//!
//! Each method is one atomic operation against the store. Nothing in this
//! crate performs a client-side read-modify-write on a counter.

mod error;
mod memory;

pub use error::*;
pub use memory::*;

use crate::{Counter, Lead, LeadId, LeadUpdate, NewLead, Page, PageQuery};
use core::future::Future;

/// What a partial update did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// A lead with the requested ID exists.
    pub matched: bool,
    /// At least one field took a new value.
    pub modified: bool,
}

/// Storage for named sequence counters.
pub trait CounterStore: Send + Sync {
    /// Atomically increments the counter called `name`, creating it at zero
    /// first if it does not exist, and returns the counter after the
    /// increment.
    ///
    /// Two concurrent calls for the same `name` never observe the same `seq`.
    ///
    /// # Errors
    /// - [`StoreError::SequenceExhausted`] if the counter cannot move forward.
    /// - Any other [`StoreError`] if the store cannot perform the operation.
    fn increment(&self, name: &str) -> impl Future<Output = StoreResult<Counter>> + Send;
}

/// Storage for lead documents.
pub trait LeadStore: Send + Sync {
    /// Inserts a new lead. Fails with [`StoreError::DuplicateKey`] if the ID
    /// is already taken.
    fn insert(&self, lead: NewLead) -> impl Future<Output = StoreResult<Lead>> + Send;

    fn find_by_id(&self, id: LeadId) -> impl Future<Output = StoreResult<Option<Lead>>> + Send;

    /// Returns every lead in the store's natural order.
    fn find_all(&self) -> impl Future<Output = StoreResult<Vec<Lead>>> + Send;

    /// Returns one page of leads sorted by creation time (ties broken by ID)
    /// and the total number of leads.
    fn find_page(&self, query: PageQuery) -> impl Future<Output = StoreResult<Page<Lead>>> + Send;

    /// Applies a partial update to the lead with `id`.
    ///
    /// A missing lead is not an error: the outcome reports `matched: false`.
    /// When `update.expected_version` is set and differs from the stored
    /// version, nothing is written and [`StoreError::VersionConflict`] is
    /// returned.
    fn update_by_id(
        &self,
        id: LeadId,
        update: LeadUpdate,
    ) -> impl Future<Output = StoreResult<UpdateOutcome>> + Send;

    /// Removes the lead with `id`, returning whether one existed.
    fn delete_by_id(&self, id: LeadId) -> impl Future<Output = StoreResult<bool>> + Send;
}

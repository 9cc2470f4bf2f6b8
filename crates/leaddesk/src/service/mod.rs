//! The Lead record service.
//!
//! [`LeadService`] validates requests, derives the commission and allocates
//! IDs through a [`SequenceGenerator`] before handing records to a store. It
//! holds no state of its own besides the shared store handle, so clones are
//! cheap and can be moved into request handlers freely.


use crate::{
    CounterStore, CreateLead, Error, Lead, LeadId, LeadPatch, LeadStore, NewLead, Page,
    PageQuery, Result, SearchLeads, SequenceGenerator, SortOrder, StoreError, UpdateOutcome,
    estimated_commission,
};
use std::sync::Arc;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Name of the id-space lead IDs are drawn from.
pub const LEAD_SEQUENCE: &str = "lead";

/// How many times a commission recomputation re-reads the lead after losing a
/// race before giving up with [`Error::Conflict`].
pub const MAX_UPDATE_ATTEMPTS: usize = 8;

/// CRUD operations over leads with a derived commission.
///
/// # Example
/// ```
/// use leaddesk::{CreateLead, LeadPatch, LeadService, MemoryStore};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> leaddesk::Result<()> {
/// let service = LeadService::new(Arc::new(MemoryStore::new()));
///
/// let lead = service
///     .create(CreateLead {
///         name: Some("Ada".into()),
///         email: Some("ada@example.com".into()),
///         status: Some("qualified".into()),
///         estimated_sale_amount: Some(1000_i64.into()),
///     })
///     .await?;
/// assert_eq!(lead.estimated_commission, 50);
///
/// let patch = LeadPatch {
///     status: Some("unqualified".into()),
///     ..LeadPatch::default()
/// };
/// service.update_by_id("1", Some(patch)).await?;
/// assert_eq!(service.get_by_id("1").await?.estimated_commission, 0);
/// # Ok(())
/// # }
/// ```
pub struct LeadService<S> {
    store: Arc<S>,
    sequence: SequenceGenerator<S>,
}

impl<S> Clone for LeadService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            sequence: self.sequence.clone(),
        }
    }
}

impl<S> LeadService<S>
where
    S: LeadStore + CounterStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            sequence: SequenceGenerator::new(Arc::clone(&store)),
            store,
        }
    }

    /// The store this service writes to.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validates `request`, allocates the next lead ID and inserts the lead.
    ///
    /// Validation runs before any store access, so an invalid request leaves
    /// both the counter and the leads untouched. Once an ID has been
    /// allocated it is consumed even if the insert fails.
    ///
    /// # Errors
    /// - [`Error::InvalidRequest`] if a required field is missing or blank.
    /// - [`Error::InvalidEmail`] / [`Error::InvalidAmount`] for malformed
    ///   values.
    /// - [`Error::StorageUnavailable`] if the ID cannot be allocated or the
    ///   insert fails.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub async fn create(&self, request: CreateLead) -> Result<Lead> {
        let valid = request.validate()?;
        let commission = estimated_commission(valid.estimated_sale_amount, &valid.status);

        let id = LeadId::new(self.sequence.next_value(LEAD_SEQUENCE).await?);
        let lead = self
            .store
            .insert(NewLead {
                id,
                name: valid.name,
                email: valid.email,
                status: valid.status,
                estimated_sale_amount: valid.estimated_sale_amount,
                estimated_commission: commission,
            })
            .await?;

        #[cfg(feature = "tracing")]
        tracing::info!(id = %lead.id, "created lead");

        Ok(lead)
    }

    /// Fetches one lead.
    ///
    /// # Errors
    /// - [`Error::InvalidRequest`] / [`Error::InvalidId`] if `id` is blank or
    ///   not a non-negative integer. The store is not consulted.
    /// - [`Error::NotFound`] if no lead has that ID.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub async fn get_by_id(&self, id: &str) -> Result<Lead> {
        let id = LeadId::parse(id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or(Error::NotFound { id })
    }

    /// Every lead, ordered by ID.
    pub async fn list(&self) -> Result<Vec<Lead>> {
        Ok(self.store.find_all().await?)
    }

    /// One page of leads sorted by creation time together with the total
    /// number of leads.
    ///
    /// `sort_code` `"1"` sorts newest first; anything else oldest first.
    /// `limit == 0` returns everything after `chunk_index`.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub async fn list_paginated(
        &self,
        chunk_index: u64,
        limit: u64,
        sort_code: &str,
    ) -> Result<Page<Lead>> {
        self.page(PageQuery {
            skip: chunk_index,
            limit,
            order: SortOrder::from_code(sort_code),
        })
        .await
    }

    /// [`Self::list_paginated`] driven by a wire-level search body.
    ///
    /// # Errors
    /// [`Error::InvalidRequest`] if `chunkIndex` is missing or either
    /// `chunkIndex` or `limit` is not a non-negative integer.
    pub async fn search(&self, request: SearchLeads) -> Result<Page<Lead>> {
        self.page(request.into_query()?).await
    }

    async fn page(&self, query: PageQuery) -> Result<Page<Lead>> {
        Ok(self.store.find_page(query).await?)
    }

    /// Applies `patch` to the lead with `id`.
    ///
    /// When the patch changes the amount or the status, the commission is
    /// recomputed from the patched values layered over the stored ones and
    /// written in the same update, conditioned on the version that was read.
    /// A lost race re-reads and tries again, up to [`MAX_UPDATE_ATTEMPTS`]
    /// times.
    ///
    /// A missing lead is not an error; the outcome reports `matched: false`.
    ///
    /// # Errors
    /// - [`Error::InvalidRequest`] / [`Error::InvalidId`] for a bad `id` or a
    ///   missing `patch`.
    /// - [`Error::InvalidEmail`] / [`Error::InvalidAmount`] for malformed
    ///   patch values.
    /// - [`Error::Conflict`] if the lead kept changing on every attempt.
    /// - [`Error::StorageUnavailable`] on store failure.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, patch)))]
    pub async fn update_by_id(&self, id: &str, patch: Option<LeadPatch>) -> Result<UpdateOutcome> {
        let id = LeadId::parse(id)?;
        let patch = patch.ok_or_else(|| Error::invalid_request("update_obj is required"))?;
        let update = patch.into_update()?;

        if !update.touches_commission_inputs() {
            return Ok(self.store.update_by_id(id, update).await?);
        }

        for _attempt in 0..MAX_UPDATE_ATTEMPTS {
            let Some(current) = self.store.find_by_id(id).await? else {
                return Ok(UpdateOutcome::default());
            };

            let amount = update
                .estimated_sale_amount
                .unwrap_or(current.estimated_sale_amount);
            let status = update.status.as_deref().unwrap_or(&current.status);

            let mut attempt = update.clone();
            attempt.estimated_commission = Some(estimated_commission(amount, status));
            attempt.expected_version = Some(current.version);

            match self.store.update_by_id(id, attempt).await {
                Err(StoreError::VersionConflict { .. }) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(attempt = _attempt, "lead changed while recomputing commission");
                    continue;
                }
                outcome => return Ok(outcome?),
            }
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(%id, "giving up on commission recomputation");

        Err(Error::Conflict { id })
    }

    /// Removes the lead with `id`, returning whether one existed.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let id = LeadId::parse(id)?;
        Ok(self.store.delete_by_id(id).await?)
    }
}

//! Error types for the Lead record service.
//!
//! Validation failures are reported before anything touches the store, so a
//! caller that receives one of the `Invalid*` variants can rely on nothing
//! having been persisted. Every failure coming out of the persistence layer is
//! folded into [`Error::StorageUnavailable`].

use crate::{LeadId, StoreError};

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors the service layer can produce.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required field or parameter was missing, or the request was
    /// malformed.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The email address does not have a valid syntax.
    #[error("email is not a valid email: {email:?}")]
    InvalidEmail { email: String },

    /// The estimated sale amount is not a number.
    #[error("estimated sale amount is not a valid number: {value:?}")]
    InvalidAmount { value: String },

    /// The lead ID is not a non-negative integer.
    #[error("invalid lead id: {value:?}")]
    InvalidId { value: String },

    /// No lead exists with the requested ID.
    #[error("lead {id} not found")]
    NotFound { id: LeadId },

    /// The lead kept changing underneath a commission recomputation.
    #[error("lead {id} was modified concurrently")]
    Conflict { id: LeadId },

    /// The store failed to carry out an operation.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl Error {
    pub(crate) fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. }
                | Self::InvalidEmail { .. }
                | Self::InvalidAmount { .. }
                | Self::InvalidId { .. }
        )
    }
}

//! Caller-facing request shapes.
//!
//! These mirror the JSON bodies accepted by the HTTP layer. Every field is
//! optional at the type level so that a missing field can be reported as
//! [`Error::InvalidRequest`] instead of a deserialization failure. A blank
//! string counts as missing.

use crate::{
    DEFAULT_PAGE_LIMIT, Error, LeadUpdate, NumericInput, PageQuery, Result, SortOrder,
    is_valid_email,
};
use serde::{Deserialize, Serialize};

/// Fields for a new lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLead {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub estimated_sale_amount: Option<NumericInput>,
}

/// A partial update to a lead.
///
/// Only the fields listed here can be changed; the ID, the commission and the
/// timestamps are owned by the service and the store. Unknown fields are
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LeadPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub estimated_sale_amount: Option<NumericInput>,
}

/// Body of an update request: `{ "update_obj": { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateLeadRequest {
    pub update_obj: Option<LeadPatch>,
}

/// Body of a paginated search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLeads {
    pub chunk_index: Option<NumericInput>,
    pub limit: Option<NumericInput>,
    pub sort_code: Option<NumericInput>,
}

/// A validated create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidLead {
    pub name: String,
    pub email: String,
    pub status: String,
    pub estimated_sale_amount: i64,
}

impl CreateLead {
    /// Checks required fields, then the email, then the amount.
    pub(crate) fn validate(self) -> Result<ValidLead> {
        let name = present(self.name);
        let email = present(self.email);
        let status = present(self.status);
        let amount = self.estimated_sale_amount.filter(|amount| !amount.is_blank());

        let (Some(name), Some(email), Some(status), Some(amount)) = (name, email, status, amount)
        else {
            return Err(Error::invalid_request(
                "name, email, estimatedSaleAmount and status are required",
            ));
        };

        let email = checked_email(email)?;
        let estimated_sale_amount = checked_amount(&amount)?;

        Ok(ValidLead {
            name,
            email,
            status,
            estimated_sale_amount,
        })
    }
}

impl LeadPatch {
    /// Validates the patch into a [`LeadUpdate`] without a commission.
    ///
    /// # Errors
    /// - [`Error::InvalidEmail`] if an email is present and malformed.
    /// - [`Error::InvalidAmount`] if an amount is present and not numeric.
    pub fn into_update(self) -> Result<LeadUpdate> {
        let email = present(self.email).map(checked_email).transpose()?;
        let estimated_sale_amount = self
            .estimated_sale_amount
            .filter(|amount| !amount.is_blank())
            .map(|amount| checked_amount(&amount))
            .transpose()?;

        Ok(LeadUpdate {
            name: present(self.name),
            email,
            status: present(self.status),
            estimated_sale_amount,
            ..LeadUpdate::default()
        })
    }
}

impl SearchLeads {
    /// Resolves the search into a page window. `chunkIndex` is required,
    /// `limit` defaults to [`DEFAULT_PAGE_LIMIT`] and `sortCode` to `"0"`.
    pub fn into_query(self) -> Result<PageQuery> {
        let skip = self
            .chunk_index
            .filter(|index| !index.is_blank())
            .ok_or_else(|| Error::invalid_request("chunkIndex is required"))?;
        let skip = skip.to_index().ok_or_else(|| {
            Error::invalid_request(format!(
                "chunkIndex must be a non-negative integer, got {}",
                skip.as_text()
            ))
        })?;

        let limit = match self.limit.filter(|limit| !limit.is_blank()) {
            Some(limit) => limit.to_index().ok_or_else(|| {
                Error::invalid_request(format!(
                    "limit must be a non-negative integer, got {}",
                    limit.as_text()
                ))
            })?,
            None => DEFAULT_PAGE_LIMIT,
        };

        let order = self
            .sort_code
            .map(|code| SortOrder::from_code(&code.as_text()))
            .unwrap_or_default();

        Ok(PageQuery { skip, limit, order })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn checked_email(email: String) -> Result<String> {
    if is_valid_email(&email) {
        Ok(email)
    } else {
        Err(Error::InvalidEmail { email })
    }
}

fn checked_amount(amount: &NumericInput) -> Result<i64> {
    amount.to_amount().ok_or_else(|| Error::InvalidAmount {
        value: amount.as_text(),
    })
}

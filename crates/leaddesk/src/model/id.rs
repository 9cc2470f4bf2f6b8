use crate::{Error, Result};
use core::{fmt, str::FromStr};
use serde::{Deserialize, Serialize};

/// The integer identifier of a lead.
///
/// Values are handed out by the [`SequenceGenerator`] from the `"lead"`
/// id-space and never change once assigned.
///
/// [`SequenceGenerator`]: crate::SequenceGenerator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(u64);

impl LeadId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parses an ID as it arrives from a caller.
    ///
    /// # Errors
    /// - [`Error::InvalidRequest`] if `raw` is empty or whitespace.
    /// - [`Error::InvalidId`] if `raw` is not a non-negative integer.
    ///
    /// # Example
    /// ```
    /// use leaddesk::{Error, LeadId};
    ///
    /// assert_eq!(LeadId::parse("42").unwrap().get(), 42);
    /// assert!(matches!(LeadId::parse("abc"), Err(Error::InvalidId { .. })));
    /// assert!(matches!(LeadId::parse(""), Err(Error::InvalidRequest { .. })));
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_request("lead id is required"));
        }
        trimmed
            .parse::<u64>()
            .map(Self)
            .map_err(|_| Error::InvalidId {
                value: raw.to_owned(),
            })
    }
}

impl FromStr for LeadId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<u64> for LeadId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

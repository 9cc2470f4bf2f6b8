use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The last value handed out for one named id-space.
///
/// A counter is created implicitly the first time its id-space is used and is
/// only ever moved forward through [`CounterStore::increment`].
///
/// [`CounterStore::increment`]: crate::CounterStore::increment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    pub name: String,
    pub seq: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Counter {
    /// A counter that has not issued anything yet.
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            seq: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the counter forward by one and returns the new value, or `None`
    /// if the id-space is exhausted. An exhausted counter is left untouched.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Option<u64> {
        let next = self.seq.checked_add(1)?;
        self.seq = next;
        self.updated_at = now;
        Some(next)
    }
}

use serde::{Deserialize, Serialize};

/// Page size used when a search does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Creation-time ordering of a paginated search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Oldest first. Sort code `"0"`.
    #[default]
    Ascending,
    /// Newest first. Sort code `"1"`.
    Descending,
}

impl SortOrder {
    /// Maps a wire sort code to an order. `"1"` sorts newest first; every
    /// other code, including unknown ones, sorts oldest first.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => Self::Descending,
            _ => Self::Ascending,
        }
    }
}

/// A skip/limit window over all leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    /// Number of leads to skip (the chunk index).
    pub skip: u64,
    /// Maximum number of leads to return; `0` means no limit.
    pub limit: u64,
    pub order: SortOrder,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
            order: SortOrder::default(),
        }
    }
}

/// One page of results together with the unpaged total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub data: Vec<T>,
}

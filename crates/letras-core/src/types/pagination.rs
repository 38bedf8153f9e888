//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Request parameters for a paginated read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub limit: u64,
}

impl PageRequest {
    /// Create a page request, coercing `page` to at least 1 and `limit`
    /// into `1..=max_limit`.
    pub fn new(page: u64, limit: u64, max_limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, max_limit.max(1)),
        }
    }

    /// Number of records preceding this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Number of pages needed to hold `total_count` records, `ceil(total / limit)`.
pub fn total_pages(total_count: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total_count.div_ceil(limit)
}

/// An ordered slice of a collection with count metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The items on this page.
    pub data: Vec<T>,
    /// Total number of records in the collection at query time.
    pub total_count: u64,
    /// Current page number (1-based).
    pub current_page: u64,
    /// Page size the page was computed with.
    pub limit: u64,
    /// `ceil(total_count / limit)`.
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Create a new page.
    pub fn new(data: Vec<T>, current_page: u64, limit: u64, total_count: u64) -> Self {
        Self {
            data,
            total_count,
            current_page,
            limit,
            total_pages: total_pages(total_count, limit),
        }
    }

    /// Cut the requested page out of `prefix`, the first records of an
    /// ordered sequence of `total_count` records. A page past the end of
    /// `prefix` is empty.
    pub fn from_prefix(prefix: Vec<T>, request: &PageRequest, total_count: u64) -> Self {
        let data = prefix
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.limit).unwrap_or(usize::MAX))
            .collect();
        Self::new(data, request.page, request.limit, total_count)
    }

    /// Map the items while keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total_count: self.total_count,
            current_page: self.current_page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

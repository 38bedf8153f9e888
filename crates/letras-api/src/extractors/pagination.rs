//! Pagination query parameter extractor.

use serde::{Deserialize, Serialize};

use letras_core::types::pagination::PageRequest;

/// Query parameters for paginated endpoints.
///
/// Values are lenient: a missing or non-positive `page` means page 1, and a
/// missing or non-positive `limit` means the endpoint's default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-based).
    pub page: Option<i64>,
    /// Items per page.
    pub limit: Option<i64>,
    /// List the whole collection instead of one page.
    #[serde(default)]
    pub all: bool,
}

impl PaginationParams {
    /// Converts to a `PageRequest`, capping the limit at `max_limit`.
    pub fn into_page_request(self, default_limit: u64, max_limit: u64) -> PageRequest {
        let page = self
            .page
            .and_then(|p| u64::try_from(p).ok())
            .unwrap_or(1);
        let limit = self
            .limit
            .and_then(|l| u64::try_from(l).ok())
            .filter(|l| *l > 0)
            .unwrap_or(default_limit);
        PageRequest::new(page, limit, max_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, limit: Option<i64>) -> PaginationParams {
        PaginationParams {
            page,
            limit,
            all: false,
        }
    }

    #[test]
    fn test_defaults() {
        let req = PaginationParams::default().into_page_request(12, 100);
        assert_eq!(req, PageRequest { page: 1, limit: 12 });
    }

    #[test]
    fn test_non_positive_values_coerced() {
        let req = params(Some(-3), Some(0)).into_page_request(10, 100);
        assert_eq!(req, PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn test_limit_capped() {
        let req = params(Some(4), Some(5000)).into_page_request(12, 100);
        assert_eq!(req, PageRequest { page: 4, limit: 100 });
    }
}

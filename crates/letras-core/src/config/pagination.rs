//! Paging defaults for list endpoints.

use serde::{Deserialize, Serialize};

/// Limits applied when a list request omits or overshoots `limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when a collection declares no default of its own.
    #[serde(default = "default_limit")]
    pub default_limit: u64,
    /// Upper bound for a caller-supplied `limit`.
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> u64 {
    12
}

fn default_max_limit() -> u64 {
    100
}

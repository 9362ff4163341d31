//! This modules defines the common functionality for paging data.

use serde::{Deserialize, Serialize};

/// The number of items returned by a list endpoint when the request does not
/// specify a limit.
pub const DEFAULT_LIMIT: u64 = 100;

/// The config for pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// The maximum number of items to return when not specified in a request.
    pub default_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
        }
    }
}

/// The pagination parameters in the query string of a list request.
///
/// Both parameters are optional, missing values are filled in from the
/// [PaginationConfig] by [PaginationQuery::resolve].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationQuery {
    /// The number of items to skip.
    pub skip: Option<u64>,
    /// The maximum number of items to return.
    pub limit: Option<u64>,
}

/// A window into a list of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The number of items before the start of the page.
    pub skip: u64,
    /// The maximum number of items in the page.
    pub limit: u64,
}

impl PaginationQuery {
    /// Fill in missing parameters: `skip` defaults to zero and `limit` to
    /// the configured default.
    pub fn resolve(self, config: &PaginationConfig) -> Page {
        Page {
            skip: self.skip.unwrap_or(0),
            limit: self.limit.unwrap_or(config.default_limit),
        }
    }
}

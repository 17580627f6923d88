//! This module defines the common functionality for paging listings.

use serde::Deserialize;

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to use when not specified in a request.
    pub default_page: u64,
    /// The number of items per page to use when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// The raw paging query parameters accepted by listing endpoints.
///
/// The parameters are kept as strings so that malformed values can fall back
/// to the configured defaults instead of failing the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// The requested page number, starting from 1.
    pub page: Option<String>,
    /// The requested page size.
    pub limit: Option<String>,
}

impl PageQuery {
    /// Resolve the raw query parameters against `config`.
    ///
    /// Values that are missing, unparseable, or less than one fall back to
    /// the defaults.
    pub fn normalize(&self, config: &PaginationConfig) -> (u64, u64) {
        let page = parse_positive(self.page.as_deref()).unwrap_or(config.default_page);
        let limit = parse_positive(self.limit.as_deref()).unwrap_or(config.default_page_size);

        (page, limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|string| string.parse::<u64>().ok())
        .filter(|&value| value >= 1)
}

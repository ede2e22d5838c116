//! Application Configuration
//!
//! Configuration for the Catalog application layer.

use platform::pagination::{PageParams, PageRequest};

/// Catalog application configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Page size when `?limit=` is absent
    pub default_page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
        }
    }
}

impl CatalogConfig {
    /// Resolve `?limit=&offset=` against the configured default
    pub fn page(&self, params: PageParams) -> PageRequest {
        params.resolve(self.default_page_size)
    }
}

//! Limit/Offset Pagination
//!
//! Query parameters and response envelope shared by every list endpoint.

use serde::{Deserialize, Serialize};

/// Hard upper bound for `limit`
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?limit=&offset=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub offset: u32,
}

impl PageParams {
    /// Apply the default size and clamp to `1..=MAX_PAGE_SIZE`
    pub fn resolve(self, default_limit: u32) -> PageRequest {
        let limit = self
            .limit
            .unwrap_or(default_limit)
            .clamp(1, MAX_PAGE_SIZE);
        PageRequest {
            limit,
            offset: self.offset.unwrap_or(0),
        }
    }
}

impl PageRequest {
    /// Everything in one page (internal callers, tests)
    pub const ALL: PageRequest = PageRequest {
        limit: u32::MAX,
        offset: 0,
    };

    pub fn limit_i64(&self) -> i64 {
        i64::from(self.limit)
    }

    pub fn offset_i64(&self) -> i64 {
        i64::from(self.offset)
    }

    /// Slice an in-memory collection by this window
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Total number of matching items
    pub count: u64,
    /// Offset of the next page, if any
    pub next_offset: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: u64, request: PageRequest) -> Self {
        let end = u64::from(request.offset) + results.len() as u64;
        let next_offset = if end < count {
            u32::try_from(end).ok()
        } else {
            None
        };
        Self {
            count,
            next_offset,
            results,
        }
    }

    /// Convert each item, keeping the envelope
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next_offset: self.next_offset,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_and_clamps() {
        let req = PageParams::default().resolve(10);
        assert_eq!(req, PageRequest { limit: 10, offset: 0 });

        let req = PageParams { limit: Some(1000), offset: Some(5) }.resolve(10);
        assert_eq!(req.limit, MAX_PAGE_SIZE);
        assert_eq!(req.offset, 5);

        let req = PageParams { limit: Some(0), offset: None }.resolve(10);
        assert_eq!(req.limit, 1);
    }

    #[test]
    fn test_apply_slices() {
        let req = PageRequest { limit: 2, offset: 1 };
        assert_eq!(req.apply(vec![1, 2, 3, 4]), vec![2, 3]);
        assert_eq!(PageRequest::ALL.apply(vec![1, 2]), vec![1, 2]);
    }

    #[test]
    fn test_next_offset() {
        let req = PageRequest { limit: 2, offset: 0 };
        let page = Page::new(vec!['a', 'b'], 3, req);
        assert_eq!(page.next_offset, Some(2));

        let req = PageRequest { limit: 2, offset: 2 };
        let page = Page::new(vec!['c'], 3, req);
        assert_eq!(page.next_offset, None);
    }

    #[test]
    fn test_map_keeps_envelope() {
        let page = Page::new(vec![1, 2], 5, PageRequest { limit: 2, offset: 0 }).map(|n| n * 10);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(page.count, 5);
        assert_eq!(page.next_offset, Some(2));
    }
}

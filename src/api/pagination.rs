//! Page-number walking over the paged envelope
//!
//! List endpoints accept `?page=N&page_size=M` starting at page 1. Walking
//! stops on an empty page, a short page, or once `total` items were seen.

use super::types::PagedResponse;

/// Default number of items requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Upper bound on pages walked in one listing
pub const MAX_PAGES: u32 = 1000;

/// Position in a page-number listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    /// Page to request next, starting at 1
    pub page: u32,
    /// Items requested per page
    pub page_size: u32,
    /// Items seen so far
    pub fetched: u64,
    /// No more pages to fetch
    pub done: bool,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageCursor {
    /// Start a listing at page 1
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            fetched: 0,
            done: false,
        }
    }

    /// Query parameters for the next request
    pub fn params(&self) -> [(String, String); 2] {
        [
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ]
    }

    /// Record a fetched page and decide whether another is needed
    pub fn advance<T>(&mut self, response: &PagedResponse<T>) {
        let count = response.result.len() as u64;
        self.fetched += count;

        if count == 0
            || count < u64::from(self.page_size)
            || (response.total > 0 && self.fetched >= response.total)
            || self.page >= MAX_PAGES
        {
            self.done = true;
            return;
        }

        self.page += 1;
    }
}

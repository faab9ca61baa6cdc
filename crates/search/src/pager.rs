//! Result pages and navigation affordances.

use serde::{Deserialize, Serialize};

use crate::listing::ListingSummary;

/// One page of search results with paging bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    pub items: Vec<ListingSummary>,
    /// Match count before pagination.
    pub total_count: u64,
    /// Current page number (1-indexed).
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of pages.
    pub total_pages: u32,
    /// Whether there's a next page.
    pub has_next: bool,
    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl ResultPage {
    /// Create a new page with navigation affordances computed.
    pub fn new(items: Vec<ListingSummary>, total_count: u64, page: u32, per_page: u32) -> Self {
        let total_pages = if per_page > 0 {
            total_count.div_ceil(u64::from(per_page)) as u32
        } else {
            1
        };

        Self {
            items,
            total_count,
            page,
            per_page,
            total_pages,
            has_next: u64::from(page) * u64::from(per_page) < total_count,
            has_prev: page > 1,
        }
    }

    /// Create an empty page.
    pub fn empty(page: u32, per_page: u32) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page,
            per_page,
            total_pages: 0,
            has_next: false,
            has_prev: false,
        }
    }

    /// 1-based inclusive range of result positions visible on this page,
    /// or `None` when there are no results (renders as "0 results",
    /// never as `1..0`).
    pub fn visible_range(&self) -> Option<(u64, u64)> {
        if self.total_count == 0 {
            return None;
        }
        let start = u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page) + 1;
        let end = (u64::from(self.page) * u64::from(self.per_page)).min(self.total_count);
        if start > end {
            // Page is past the end of the result set.
            return None;
        }
        Some((start, end))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

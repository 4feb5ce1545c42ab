//! # Pagination
//!
//! Page-number pagination shared by the product and order listings.
//!
//! ```text
//! GET /api/v1/orders?page=2   (page_size = 10)
//!      │
//!      ▼
//! PageRequest { page: 2, page_size: 10 } ──► OFFSET 10 LIMIT 10
//!      │
//!      ▼
//! Page { count: 23, page: 2, page_size: 10, results: [11 … 20] }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Creates a page request.
    ///
    /// `page` starts at 1. `page_size` must be within `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, page_size: u32) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::MustBePositive {
                field: "page".to_string(),
            });
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::OutOfRange {
                field: "page_size".to_string(),
                min: 1,
                max: MAX_PAGE_SIZE as i64,
            });
        }
        Ok(Self { page, page_size })
    }

    /// First page with the given size. Size is clamped into the valid range.
    pub fn first(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip, for `OFFSET`.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    /// Rows to return, for `LIMIT`.
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total matching rows across all pages.
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(request: PageRequest, count: i64, results: Vec<T>) -> Self {
        Self {
            count,
            page: request.page(),
            page_size: request.page_size(),
            results,
        }
    }

    /// Converts every result, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            results: self.results.into_iter().map(f).collect(),
        }
    }

    /// Whether a later page has rows.
    pub fn has_next(&self) -> bool {
        (self.page as i64) * (self.page_size as i64) < self.count
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

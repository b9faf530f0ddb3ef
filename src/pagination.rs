//! Fixed-size pages over ordered result sequences

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Number of entries per page in every list
pub const PAGE_SIZE: usize = 10;

/// One page of an ordered sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of entries across all pages
    pub total: usize,
    /// Current page number (1-based)
    pub page: usize,
    pub per_page: usize,
    pub num_pages: usize,
}

impl<T> Page<T> {
    /// Cut page `page` (1-based) out of `items` using [`PAGE_SIZE`].
    ///
    /// The first page always exists, even for an empty sequence. Any other
    /// page outside the range is `NotFound`.
    pub fn paginate(items: Vec<T>, page: usize) -> AppResult<Self> {
        Self::paginate_by(items, page, PAGE_SIZE)
    }

    pub fn paginate_by(items: Vec<T>, page: usize, per_page: usize) -> AppResult<Self> {
        if per_page == 0 {
            return Err(AppError::Internal("page size must be positive".to_string()));
        }
        let total = items.len();
        let num_pages = total.div_ceil(per_page).max(1);
        if page == 0 || page > num_pages {
            return Err(AppError::NotFound(format!("Page {} does not exist", page)));
        }

        let items = items
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();

        Ok(Self {
            items,
            total,
            page,
            per_page,
            num_pages,
        })
    }

    /// More than one page exists
    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

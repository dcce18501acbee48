use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    /// `page` and `limit` fall back to the first page of `DEFAULT_PAGE_SIZE`
    /// items. A limit above `MAX_PAGE_SIZE` is clamped.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, &'static str> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err("page must not be less than 1");
        }

        if limit < 1 {
            return Err("limit must not be less than 1");
        }

        Ok(Page {
            page,
            limit: limit.min(MAX_PAGE_SIZE),
        })
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

impl Default for Page {
    fn default() -> Self {
        Page {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of items together with the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: Page,
}

impl<T> Paginated<T> {
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page.limit as usize)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
        }
    }
}

/// Slice an already filtered, already ordered set of rows.
pub fn paginate<T: Clone>(rows: &[T], page: Page) -> Paginated<T> {
    let items = rows
        .iter()
        .skip(page.offset())
        .take(page.limit as usize)
        .cloned()
        .collect();

    Paginated {
        items,
        total: rows.len(),
        page,
    }
}

/// Pagination metadata of a list response.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub total_pages: usize,
}

impl<T> From<&Paginated<T>> for Pagination {
    fn from(p: &Paginated<T>) -> Self {
        Pagination {
            total: p.total,
            page: p.page.page,
            limit: p.page.limit,
            total_pages: p.total_pages(),
        }
    }
}

// `true`/`false` filter on a boolean column, anything else means no filter
pub fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

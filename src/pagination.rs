use serde::Serialize;

/// Page numbers (1-based) to show in a pager: both edges, a window around
/// the current page, and `None` where pages were elided.
fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Client-side pager over an in-memory list. Pages are 0-based; moving past
/// either end is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    page: usize,
}

impl Pager {
    /// A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }

    pub fn next(&mut self, len: usize) {
        if self.page + 1 < self.total_pages(len) {
            self.page += 1;
        }
    }

    pub fn prev(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    pub fn set_page(&mut self, page: usize, len: usize) {
        self.page = page.min(self.total_pages(len).saturating_sub(1));
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total_pages: usize,
}

impl<T: Clone> Paginated<T> {
    /// Current page of `items` as seen by `pager`; `page` is 1-based here.
    pub fn from_pager(items: &[T], pager: &Pager) -> Self {
        let total_pages = pager.total_pages(items.len());
        let page = pager.page() + 1;
        Self {
            items: pager.slice(items).to_vec(),
            pages: get_pages(total_pages, page, 2, 2, 4, 2),
            page,
            total_pages,
        }
    }
}

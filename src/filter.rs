use crate::pagination::{Paginated, Pager};

/// Case-insensitive substring match of `query` against any of `fields`.
/// A blank query matches everything.
pub fn matches_query(query: &str, fields: &[Option<&str>]) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn filter_items<T, F>(items: &[T], query: &str, fields: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> Vec<Option<&str>>,
{
    items
        .iter()
        .filter(|item| matches_query(query, &fields(*item)))
        .cloned()
        .collect()
}

/// Searchable, paginated list state. The filtered list is recomputed and the
/// page reset to the first one whenever the query or the source changes.
pub struct ListView<T> {
    source: Vec<T>,
    query: String,
    filtered: Vec<T>,
    pager: Pager,
    fields: fn(&T) -> Vec<Option<&str>>,
}

impl<T: Clone> ListView<T> {
    pub fn new(page_size: usize, fields: fn(&T) -> Vec<Option<&str>>) -> Self {
        Self {
            source: Vec::new(),
            query: String::new(),
            filtered: Vec::new(),
            pager: Pager::new(page_size),
            fields,
        }
    }

    pub fn set_source(&mut self, source: Vec<T>) {
        self.source = source;
        self.refilter();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filtered(&self) -> &[T] {
        &self.filtered
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.filtered.len())
    }

    pub fn current_page(&self) -> &[T] {
        self.pager.slice(&self.filtered)
    }

    pub fn next_page(&mut self) {
        self.pager.next(self.filtered.len());
    }

    pub fn prev_page(&mut self) {
        self.pager.prev();
    }

    pub fn go_to(&mut self, page: usize) {
        self.pager.set_page(page, self.filtered.len());
    }

    pub fn paginated(&self) -> Paginated<T> {
        Paginated::from_pager(&self.filtered, &self.pager)
    }

    fn refilter(&mut self) {
        self.filtered = filter_items(&self.source, &self.query, self.fields);
        self.pager.reset();
    }
}

use serde::Serialize;

/// One page of results plus navigation metadata.
///
/// Built only through [`PageResult::assemble`] (or [`PageResult::empty`]), so the
/// derived fields always agree with the counts they were computed from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    total_count: u64,
    page_count: u64,
    page_number: u32,
    page_size: u32,
    has_previous_page: bool,
    has_next_page: bool,
    items: Vec<T>,
}

/// `max(1, ceil(total_count / page_size))`. `page_size` must be non-zero.
#[inline]
pub fn page_count(total_count: u64, page_size: u32) -> u64 {
    debug_assert!(page_size > 0, "page_size is validated upstream");
    total_count.div_ceil(u64::from(page_size.max(1))).max(1)
}

impl<T> PageResult<T> {
    /// Combine a total count, the page geometry and the item window.
    pub fn assemble(total_count: u64, page_number: u32, page_size: u32, items: Vec<T>) -> Self {
        let page_count = page_count(total_count, page_size);
        Self {
            total_count,
            page_count,
            page_number,
            page_size,
            has_previous_page: page_number > 1,
            has_next_page: u64::from(page_number) < page_count,
            items,
        }
    }

    /// Result for a missing source: no items, a single page.
    pub fn empty(page_number: u32, page_size: u32) -> Self {
        Self::assemble(0, page_number, page_size, Vec::new())
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_previous_page(&self) -> bool {
        self.has_previous_page
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Map items while preserving the page metadata (entity -> DTO convenience).
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            total_count: self.total_count,
            page_count: self.page_count,
            page_number: self.page_number,
            page_size: self.page_size,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// One page of a paginated find result.
///
/// Pages are zero-indexed. `total_pages` is the element count divided by
/// the page size, rounded up; an empty result has zero pages.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Page<T> {
    content: Vec<T>,
    total_elements: u64,
    total_pages: u64,
    page: u64,
    size: u64,
}

impl<T> Page<T> {
    pub(crate) fn new(content: Vec<T>, total_elements: u64, page: u64, size: u64) -> Self {
        Page {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(size),
            page,
            size,
        }
    }

    /// The records on this page.
    pub fn content(&self) -> &[T] {
        &self.content
    }

    /// Consumes the page and returns its records.
    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    /// Total number of matching records across all pages.
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// Total number of pages.
    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// The zero-based index of this page.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// The requested page size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Checks whether a page follows this one.
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// Checks whether a page precedes this one.
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Checks whether this page holds no records.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

//! Pagination request and result.

/// A 1-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Build a request; `page` and `limit` are clamped to at least 1.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Rows to fetch.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    /// Whether this page exists for a listing of `count` rows. The first
    /// page always exists.
    #[must_use]
    pub fn is_within(&self, count: i64) -> bool {
        self.page == 1 || self.offset() < count
    }

    /// Whether a page follows this one.
    #[must_use]
    pub fn has_next(&self, count: i64) -> bool {
        self.offset() + self.limit() < count
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<T> {
    pub count: i64,
    pub items: Vec<T>,
}

impl<T> Paginated<T> {
    /// An empty listing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            count: 0,
            items: Vec::new(),
        }
    }

    /// Transform the items, keeping the count.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            count: self.count,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        let page = PageRequest::new(3, 6);
        assert_eq!(page.offset(), 12);
        assert_eq!(page.limit(), 6);
        assert_eq!(PageRequest::new(0, 0), PageRequest::new(1, 1));
    }

    #[test]
    fn test_first_page_always_within() {
        assert!(PageRequest::new(1, 6).is_within(0));
        assert!(!PageRequest::new(2, 6).is_within(6));
        assert!(PageRequest::new(2, 6).is_within(7));
    }

    #[test]
    fn test_has_next() {
        assert!(PageRequest::new(1, 6).has_next(7));
        assert!(!PageRequest::new(1, 6).has_next(6));
        assert!(!PageRequest::new(2, 6).has_next(12));
    }
}

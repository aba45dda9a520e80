//! services/api/src/web/pagination.rs
//!
//! Page-number pagination for the listing endpoints.

use serde::{Deserialize, Serialize};

/// The `page`/`limit` query parameters accepted by paginated listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Resolves the raw parameters into (page, limit, offset), clamping
    /// nonsense values to page 1 / the default limit.
    pub fn resolve(&self, default_limit: i64) -> (i64, i64, i64) {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = self.limit.filter(|l| *l >= 1).unwrap_or(default_limit);
        (page, limit, (page - 1) * limit)
    }
}

/// One page of results plus the neighbouring page numbers.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, page: i64, limit: i64) -> Self {
        let next = if page * limit < count {
            Some(page + 1)
        } else {
            None
        };
        let previous = if page > 1 { Some(page - 1) } else { None };
        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_defaults_to_first_page() {
        let q = PageQuery::default();
        assert_eq!(q.resolve(6), (1, 6, 0));
    }

    #[test]
    fn resolve_computes_offset() {
        let q = PageQuery {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(q.resolve(6), (3, 10, 20));
    }

    #[test]
    fn resolve_clamps_invalid_values() {
        let q = PageQuery {
            page: Some(0),
            limit: Some(-5),
        };
        assert_eq!(q.resolve(6), (1, 6, 0));
    }

    #[test]
    fn middle_page_links_both_ways() {
        let page = Page::new(vec![1, 2], 20, 2, 6);
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));
    }

    #[test]
    fn last_page_has_no_next() {
        let page = Page::new(vec![1], 13, 3, 6);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(2));
    }

    #[test]
    fn single_page_has_no_links() {
        let page = Page::new(vec![1, 2, 3], 3, 1, 6);
        assert_eq!(page.next, None);
        assert_eq!(page.previous, None);
    }
}

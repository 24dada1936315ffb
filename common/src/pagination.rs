//! Pagination envelope shared by every list endpoint.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: u32, limit: u32, total: i64) -> Paginated<T> {
        let pages = if limit == 0 {
            0
        } else {
            (total + i64::from(limit) - 1) / i64::from(limit)
        };
        Paginated {
            items,
            pagination: Pagination {
                page,
                limit,
                total,
                pages,
            },
        }
    }
}

/// Normalizes raw `page`/`limit` query values: page starts at 1, limit is
/// clamped to [1, MAX_LIMIT].
pub fn clamp(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    (page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let p = Paginated::<u8>::new(Vec::new(), 1, 10, 31);
        assert_eq!(p.pagination.pages, 4);
        let p = Paginated::<u8>::new(Vec::new(), 1, 10, 30);
        assert_eq!(p.pagination.pages, 3);
        let p = Paginated::<u8>::new(Vec::new(), 1, 10, 0);
        assert_eq!(p.pagination.pages, 0);
    }

    #[test]
    fn clamp_defaults_and_bounds() {
        assert_eq!(clamp(None, None), (1, DEFAULT_LIMIT));
        assert_eq!(clamp(Some(0), Some(0)), (1, 1));
        assert_eq!(clamp(Some(3), Some(1000)), (3, MAX_LIMIT));
    }
}

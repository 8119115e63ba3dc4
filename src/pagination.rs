//! Pagination Module
//!
//! Offset/limit math and the page envelope returned alongside query results.
//! Everything here is pure; callers fetch and slice the data themselves.

use serde::{Deserialize, Serialize};

/// Page size used when a caller does not pick one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

// == Pagination Params ==
/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub page: i64,
    pub page_size: i64,
}

impl PaginationParams {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Offset and limit for this page, see [`get_pagination_params`].
    pub fn bounds(&self) -> PageBounds {
        get_pagination_params(self.page, self.page_size)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// == Page Bounds ==
/// Row window to request from the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBounds {
    pub offset: i64,
    pub limit: i64,
}

// == Page Info ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

// == Paginated Result ==
/// One page of data plus the metadata a client needs to navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T> PaginatedResult<T> {
    /// Transforms the items while keeping the page metadata.
    pub fn map<U, F>(self, f: F) -> PaginatedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResult {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

// == Get Pagination Params ==
/// Converts a 1-indexed page into an offset/limit pair.
///
/// `offset = (page - 1) * page_size`, `limit = page_size`.
///
/// Inputs are not validated: `page < 1` produces a negative offset. Clamping
/// here would hide a bug upstream, so rejecting bad pages is left to the
/// request layer.
pub fn get_pagination_params(page: i64, page_size: i64) -> PageBounds {
    PageBounds {
        offset: (page - 1) * page_size,
        limit: page_size,
    }
}

// == Create Paginated Result ==
/// Wraps an already-sliced page of `data` with navigation metadata.
///
/// `total_pages = ceil(total / page_size)`; a non-positive `page_size` or
/// `total` yields zero pages instead of dividing by zero.
pub fn create_paginated_result<T>(
    data: Vec<T>,
    total: i64,
    params: PaginationParams,
) -> PaginatedResult<T> {
    let total_pages = total_pages(total, params.page_size);

    PaginatedResult {
        data,
        pagination: PageInfo {
            page: params.page,
            page_size: params.page_size,
            total,
            total_pages,
            has_next_page: params.page < total_pages,
            has_previous_page: params.page > 1,
        },
    }
}

fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 0;
    }
    total / page_size + i64::from(total % page_size != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pagination_params() {
        assert_eq!(
            get_pagination_params(1, 10),
            PageBounds {
                offset: 0,
                limit: 10
            }
        );
        assert_eq!(
            get_pagination_params(3, 20),
            PageBounds {
                offset: 40,
                limit: 20
            }
        );
        assert_eq!(PaginationParams::default().bounds().limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_page_below_one_is_not_clamped() {
        assert_eq!(get_pagination_params(0, 10).offset, -10);
        assert_eq!(get_pagination_params(-1, 10).offset, -20);
    }

    #[test]
    fn test_last_page() {
        let result = create_paginated_result(vec![1, 2, 3], 23, PaginationParams::new(5, 5));

        assert_eq!(result.data, vec![1, 2, 3]);
        assert_eq!(result.pagination.total, 23);
        assert_eq!(result.pagination.total_pages, 5);
        assert!(!result.pagination.has_next_page);
        assert!(result.pagination.has_previous_page);
    }

    #[test]
    fn test_first_page() {
        let result = create_paginated_result(vec!["a"; 10], 25, PaginationParams::new(1, 10));

        assert_eq!(result.pagination.total_pages, 3);
        assert!(result.pagination.has_next_page);
        assert!(!result.pagination.has_previous_page);
    }

    #[test]
    fn test_empty_and_degenerate_inputs() {
        let empty = create_paginated_result(Vec::<u8>::new(), 0, PaginationParams::new(1, 10));
        assert_eq!(empty.pagination.total_pages, 0);
        assert!(!empty.pagination.has_next_page);
        assert!(!empty.pagination.has_previous_page);

        let zero_size = create_paginated_result(Vec::<u8>::new(), 50, PaginationParams::new(1, 0));
        assert_eq!(zero_size.pagination.total_pages, 0);
    }

    #[test]
    fn test_data_passed_through_unmodified() {
        // More items than page_size: not the helper's job to slice
        let result = create_paginated_result(vec![1, 2, 3, 4], 4, PaginationParams::new(1, 2));
        assert_eq!(result.data.len(), 4);

        let labelled = result.map(|n| format!("#{n}"));
        assert_eq!(labelled.data[3], "#4");
        assert_eq!(labelled.pagination.total_pages, 2);
    }

    #[test]
    fn test_envelope_json_shape() {
        let result = create_paginated_result(vec![7], 11, PaginationParams::new(2, 5));
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["data"], serde_json::json!([7]));
        assert_eq!(json["pagination"]["pageSize"], 5);
        assert_eq!(json["pagination"]["totalPages"], 3);
        assert_eq!(json["pagination"]["hasNextPage"], true);
        assert_eq!(json["pagination"]["hasPreviousPage"], true);

        let params: PaginationParams =
            serde_json::from_str(r#"{"page":4,"pageSize":25}"#).unwrap();
        assert_eq!(params, PaginationParams::new(4, 25));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_total_pages_covers_total(total in 1i64..1_000_000, page_size in 1i64..500) {
            let pages = create_paginated_result(Vec::<()>::new(), total, PaginationParams::new(1, page_size))
                .pagination
                .total_pages;

            prop_assert!(pages * page_size >= total);
            prop_assert!((pages - 1) * page_size < total);
        }

        #[test]
        fn prop_navigation_flags(page in 1i64..200, total in 0i64..5_000, page_size in 1i64..100) {
            let info = create_paginated_result(Vec::<()>::new(), total, PaginationParams::new(page, page_size))
                .pagination;

            prop_assert_eq!(info.has_previous_page, page > 1);
            prop_assert_eq!(info.has_next_page, page < info.total_pages);
        }

        #[test]
        fn prop_consecutive_pages_are_contiguous(page in 1i64..10_000, page_size in 1i64..1_000) {
            let current = get_pagination_params(page, page_size);
            let next = get_pagination_params(page + 1, page_size);

            prop_assert_eq!(current.limit, page_size);
            prop_assert_eq!(current.offset + current.limit, next.offset);
        }
    }
}

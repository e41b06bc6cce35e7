//! Pagination calculator / 分页计算
//!
//! Raw page/limit values come straight from the query string. Anything that is
//! missing, non-numeric or out of range falls back to a default instead of
//! failing the request.

use serde::Serialize;

use crate::error::ValidationError;

/// Default page size / 默认每页数量
pub const DEFAULT_LIMIT: u64 = 10;

/// Normalized page request / 规范化后的分页请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_LIMIT }
    }
}

impl PageRequest {
    /// First record index of the page / 当前页起始偏移
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Parse a positive integer parameter / 解析正整数参数
fn parse_positive(field: &'static str, raw: Option<&str>) -> Result<u64, ValidationError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(ValidationError::Missing { field })?;
    let value: i64 = raw.parse().map_err(|_| ValidationError::NotNumeric {
        field,
        value: raw.to_string(),
    })?;
    if value < 1 {
        return Err(ValidationError::OutOfRange { field, value, min: 1 });
    }
    Ok(value as u64)
}

/// Normalize raw page/limit with `default_limit` as the limit fallback / 规范化分页参数
pub fn normalize_with(raw_page: Option<&str>, raw_limit: Option<&str>, default_limit: u64) -> PageRequest {
    let page = parse_positive("page", raw_page).unwrap_or_else(|e| {
        if raw_page.is_some() {
            tracing::debug!("Invalid pagination input, using page 1: {}", e);
        }
        1
    });
    let limit = parse_positive("limit", raw_limit).unwrap_or_else(|e| {
        if raw_limit.is_some() {
            tracing::debug!("Invalid pagination input, using limit {}: {}", default_limit, e);
        }
        default_limit.max(1)
    });
    PageRequest { page, limit }
}

/// Normalize raw page/limit with the built-in default limit / 使用默认每页数量规范化
pub fn normalize(raw_page: Option<&str>, raw_limit: Option<&str>) -> PageRequest {
    normalize_with(raw_page, raw_limit, DEFAULT_LIMIT)
}

/// `ceil(total / limit)`, zero when there is nothing to show / 总页数
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

/// Number of records on `page` given `total` matches / 指定页的记录数
pub fn page_len(total: u64, request: PageRequest) -> u64 {
    total.saturating_sub(request.offset()).min(request.limit)
}

/// Numbered page buttons around the current page / 页码窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    pub start: u64,
    pub end: u64,
    pub show_previous: bool,
    pub show_next: bool,
    pub show_first: bool,
    pub show_last: bool,
    pub leading_ellipsis: bool,
    pub trailing_ellipsis: bool,
}

impl PageWindow {
    pub fn pages(&self) -> impl Iterator<Item = u64> {
        self.start..=self.end
    }
}

/// Up to five pages centred on `current`, widened at either edge.
/// Returns `None` when there is at most one page / 只有一页时不显示
pub fn visible_pages(current: u64, total_pages: u64) -> Option<PageWindow> {
    if total_pages <= 1 {
        return None;
    }
    let mut start = current.saturating_sub(2).max(1);
    let mut end = current.saturating_add(2).min(total_pages);

    if end.saturating_sub(start) < 4 {
        if start == 1 {
            end = total_pages.min(5);
        } else {
            start = total_pages.saturating_sub(4).max(1);
        }
    }

    Some(PageWindow {
        start,
        end,
        show_previous: current > 1,
        show_next: current < total_pages,
        show_first: start > 1,
        show_last: end < total_pages,
        leading_ellipsis: start > 2,
        trailing_ellipsis: end + 1 < total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_defaults() {
        assert_eq!(normalize(None, None), PageRequest { page: 1, limit: 10 });
        assert_eq!(normalize(Some("abc"), Some("xyz")), PageRequest { page: 1, limit: 10 });
        assert_eq!(normalize(Some("0"), Some("0")), PageRequest { page: 1, limit: 10 });
        assert_eq!(normalize(Some("-3"), Some("-1")), PageRequest { page: 1, limit: 10 });
        assert_eq!(normalize(Some(""), Some(" ")), PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn test_normalize_keeps_valid_values() {
        assert_eq!(normalize(Some("3"), Some("25")), PageRequest { page: 3, limit: 25 });
        assert_eq!(normalize(Some(" 2 "), None), PageRequest { page: 2, limit: 10 });
        assert_eq!(normalize_with(None, None, 20), PageRequest { page: 1, limit: 20 });
    }

    #[test]
    fn test_parse_positive_errors() {
        assert_eq!(parse_positive("page", None), Err(ValidationError::Missing { field: "page" }));
        assert!(matches!(parse_positive("page", Some("x")), Err(ValidationError::NotNumeric { .. })));
        assert!(matches!(
            parse_positive("limit", Some("0")),
            Err(ValidationError::OutOfRange { value: 0, .. })
        ));
    }

    #[test]
    fn test_offset_and_total_pages() {
        assert_eq!(PageRequest { page: 1, limit: 10 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, limit: 10 }.offset(), 20);
        assert_eq!(PageRequest { page: u64::MAX, limit: u64::MAX }.offset(), u64::MAX);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(12, 10), 2);
        assert_eq!(total_pages(1, 10), 1);
    }

    #[test]
    fn test_page_beyond_data() {
        let request = PageRequest { page: 5, limit: 10 };
        assert_eq!(page_len(12, request), 0);
        assert_eq!(page_len(12, PageRequest { page: 2, limit: 10 }), 2);
    }

    #[test]
    fn test_visible_pages() {
        assert_eq!(visible_pages(1, 1), None);
        assert_eq!(visible_pages(1, 0), None);

        let first = visible_pages(1, 10).unwrap();
        assert_eq!((first.start, first.end), (1, 5));
        assert!(!first.show_previous && first.show_next);
        assert!(!first.show_first && first.show_last);
        assert!(first.trailing_ellipsis && !first.leading_ellipsis);

        let middle = visible_pages(5, 10).unwrap();
        assert_eq!(middle.pages().collect::<Vec<_>>(), vec![3, 4, 5, 6, 7]);
        assert!(middle.show_first && middle.leading_ellipsis);

        let last = visible_pages(10, 10).unwrap();
        assert_eq!((last.start, last.end), (6, 10));
        assert!(!last.show_next && !last.show_last);

        let short = visible_pages(2, 3).unwrap();
        assert_eq!((short.start, short.end), (1, 3));
    }

    proptest! {
        #[test]
        fn prop_page_len_matches_formula(total in 0u64..500, page in 1u64..60, limit in 1u64..50) {
            let request = PageRequest { page, limit };
            let expected = limit.min(total.saturating_sub((page - 1) * limit));
            prop_assert_eq!(page_len(total, request), expected);
            prop_assert_eq!(total_pages(total, limit), (total + limit - 1) / limit);
        }
    }
}

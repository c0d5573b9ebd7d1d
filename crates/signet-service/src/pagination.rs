//! Navigation links for offset-paginated listings.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single navigation link: the offset/limit pair of a target page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PageLink {
    /// Offset of the target page.
    pub offset: i64,
    /// Page size carried through unchanged.
    pub limit: i64,
}

/// Navigation links attached to a paginated listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PageLinks {
    /// Link to the first page. Absent on the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<PageLink>,
    /// Link to the previous page. Absent on the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
    /// Link to the next page. Absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    /// Link to the last page. Absent when already on (or past) it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<PageLink>,
}

/// Builds navigation links from an offset/limit window over `total` items.
///
/// `first`/`prev` are emitted only when the window is past the start (the
/// previous offset is floored at zero); `next` only when items remain past
/// the window; `last` only when a non-empty result set has a final page
/// ahead of the current offset. `limit` must be positive; callers clamp it
/// before building links.
pub fn build_links(limit: i64, offset: i64, total: i64) -> PageLinks {
    let mut links = PageLinks::default();

    if offset > 0 {
        links.first = Some(PageLink { offset: 0, limit });
        links.prev = Some(PageLink {
            offset: (offset - limit).max(0),
            limit,
        });
    }

    if offset + limit < total {
        links.next = Some(PageLink {
            offset: offset + limit,
            limit,
        });
    }

    if total > 0 {
        let last_page_offset = (total - 1) / limit * limit;
        if offset < last_page_offset {
            links.last = Some(PageLink {
                offset: last_page_offset,
                limit,
            });
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(offset: i64, limit: i64) -> Option<PageLink> {
        Some(PageLink { offset, limit })
    }

    #[test]
    fn middle_page_links() {
        let links = build_links(10, 10, 25);
        assert_eq!(links.first, link(0, 10));
        assert_eq!(links.prev, link(0, 10));
        assert_eq!(links.next, link(20, 10));
        assert_eq!(links.last, link(20, 10));
    }

    #[test]
    fn first_page_links() {
        let links = build_links(10, 0, 25);
        assert_eq!(links.first, None);
        assert_eq!(links.prev, None);
        assert_eq!(links.next, link(10, 10));
        assert_eq!(links.last, link(20, 10));
    }

    #[test]
    fn final_page_has_no_forward_links() {
        let links = build_links(10, 20, 25);
        assert_eq!(links.first, link(0, 10));
        assert_eq!(links.prev, link(10, 10));
        assert_eq!(links.next, None);
        assert_eq!(links.last, None);
    }

    #[test]
    fn prev_offset_is_floored_at_zero() {
        let links = build_links(10, 5, 25);
        assert_eq!(links.prev, link(0, 10));
    }

    #[test]
    fn empty_result_has_no_links() {
        assert_eq!(build_links(10, 0, 0), PageLinks::default());
    }

    #[test]
    fn exact_multiple_total() {
        // 30 items at limit 10: last page starts at offset 20.
        let links = build_links(10, 0, 30);
        assert_eq!(links.next, link(10, 10));
        assert_eq!(links.last, link(20, 10));

        let links = build_links(10, 20, 30);
        assert_eq!(links.next, None);
        assert_eq!(links.last, None);
    }

    #[test]
    fn single_page_total() {
        let links = build_links(10, 0, 7);
        assert_eq!(links, PageLinks::default());
    }
}

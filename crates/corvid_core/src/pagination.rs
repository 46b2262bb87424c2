/// Number of consecutive page links shown around the current page.
pub const PAGE_WINDOW: u32 = 5;

/// Position in the historical listing. `page` is always within `1..=total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
    total_pages: u32,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
        }
    }
}

impl PageCursor {
    pub fn new(page: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            page: page.clamp(1, total_pages),
            total_pages,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Bound an arbitrary requested page (possibly negative) to the valid range.
    pub fn clamp(&self, requested: i64) -> u32 {
        let clamped = requested.clamp(1, i64::from(self.total_pages));
        u32::try_from(clamped).unwrap_or(1)
    }

    pub fn window(&self) -> Vec<PageLink> {
        page_window(self.page, self.total_pages)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page { number: u32, current: bool },
    Ellipsis,
}

/// Navigation links for `current` out of `total` pages.
///
/// A `PAGE_WINDOW`-wide run centred on `current`, plus first/last page links
/// and ellipses when the run does not reach an edge. Empty for a single page.
pub fn page_window(current: u32, total: u32) -> Vec<PageLink> {
    if total <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total);
    let half = PAGE_WINDOW / 2;

    let mut start = current.saturating_sub(half).max(1);
    let end = (start + PAGE_WINDOW - 1).min(total);
    start = end.saturating_sub(PAGE_WINDOW - 1).max(1);

    let link = |number: u32| PageLink::Page {
        number,
        current: number == current,
    };

    let mut links = Vec::with_capacity(PAGE_WINDOW as usize + 4);
    if start > 1 {
        links.push(link(1));
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }
    links.extend((start..=end).map(link));
    if end < total {
        if end < total - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(link(total));
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(links: &[PageLink]) -> Vec<Option<u32>> {
        links
            .iter()
            .map(|link| match link {
                PageLink::Page { number, .. } => Some(*number),
                PageLink::Ellipsis => None,
            })
            .collect()
    }

    #[test]
    fn first_page_of_ten() {
        let links = page_window(1, 10);
        assert_eq!(
            numbers(&links),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(10)]
        );
        assert_eq!(
            links[0],
            PageLink::Page {
                number: 1,
                current: true
            }
        );
    }

    #[test]
    fn last_page_of_ten() {
        assert_eq!(
            numbers(&page_window(10, 10)),
            vec![Some(1), None, Some(6), Some(7), Some(8), Some(9), Some(10)]
        );
    }

    #[test]
    fn middle_page_has_both_ellipses() {
        assert_eq!(
            numbers(&page_window(5, 10)),
            vec![Some(1), None, Some(3), Some(4), Some(5), Some(6), Some(7), None, Some(10)]
        );
    }

    #[test]
    fn no_ellipsis_when_gap_is_one_page() {
        assert_eq!(
            numbers(&page_window(4, 7)),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6), Some(7)]
        );
    }

    #[test]
    fn few_pages_show_every_page() {
        assert_eq!(numbers(&page_window(2, 3)), vec![Some(1), Some(2), Some(3)]);
        assert!(page_window(1, 1).is_empty());
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn cursor_clamps_requests() {
        let cursor = PageCursor::new(3, 10);
        assert_eq!(cursor.clamp(0), 1);
        assert_eq!(cursor.clamp(-4), 1);
        assert_eq!(cursor.clamp(999), 10);
        assert_eq!(cursor.clamp(7), 7);
        assert_eq!(PageCursor::new(12, 10).page(), 10);
        assert_eq!(PageCursor::new(0, 0).total_pages(), 1);
    }
}

/// Paging parameters sent along with every page request
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PagingConfig {
    /// Number of direct replies per page
    pub count: u32,

    /// Number of levels of nested replies to include below them
    pub size: u32,
}

impl Default for PagingConfig {
    fn default() -> PagingConfig {
        PagingConfig { count: 20, size: 3 }
    }
}

/// Pagination cursor over the direct replies of one insertion point
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PageState {
    next_start: u32,
    exhausted: bool,
    is_loading: bool,
}

impl PageState {
    pub fn next_start(&self) -> u32 {
        self.next_start
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Returns the start of the page to fetch, or None if a fetch must not be issued
    pub(crate) fn begin(&mut self) -> Option<u32> {
        if self.is_loading || self.exhausted {
            return None;
        }
        self.is_loading = true;
        Some(self.next_start)
    }

    /// Whether a fetch starting at `start` is the one in flight
    pub(crate) fn is_awaiting(&self, start: u32) -> bool {
        self.is_loading && self.next_start == start
    }

    /// Failed fetches leave the cursor where it was, so that the user can retry
    pub(crate) fn fail(&mut self) {
        self.is_loading = false;
    }

    pub(crate) fn finish(&mut self, consumed: usize, has_next_page: bool) {
        self.is_loading = false;
        self.advance(consumed);
        if consumed == 0 || !has_next_page {
            self.exhausted = true;
        }
    }

    pub(crate) fn advance(&mut self, by: usize) {
        let by = u32::try_from(by).unwrap_or(u32::MAX);
        self.next_start = self.next_start.saturating_add(by);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_rejects_second_fetch() {
        let mut p = PageState::default();
        assert_eq!(p.begin(), Some(0));
        assert_eq!(p.begin(), None);
        p.finish(20, true);
        assert_eq!(p.begin(), Some(20));
    }

    #[test]
    fn failure_keeps_cursor() {
        let mut p = PageState::default();
        p.advance(5);
        assert_eq!(p.begin(), Some(5));
        p.fail();
        assert!(!p.is_loading());
        assert_eq!(p.begin(), Some(5));
    }

    #[test]
    fn empty_or_last_page_exhausts() {
        let mut p = PageState::default();
        p.begin();
        p.finish(0, true);
        assert!(p.is_exhausted());
        assert_eq!(p.begin(), None);

        let mut p = PageState::default();
        p.begin();
        p.finish(3, false);
        assert!(p.is_exhausted());
        assert_eq!(p.next_start(), 3);
    }

    #[test]
    fn only_the_fetch_in_flight_is_awaited() {
        let mut p = PageState::default();
        assert!(!p.is_awaiting(0));
        p.begin();
        assert!(p.is_awaiting(0));
        assert!(!p.is_awaiting(3));
        p.finish(3, true);
        assert!(!p.is_awaiting(0));
        assert!(!p.is_awaiting(3));
    }
}

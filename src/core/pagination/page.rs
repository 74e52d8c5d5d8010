//! Page-window arithmetic and navigation rules.
//!
//! Everything in here is pure: no I/O, no clock. Page indices are zero-based;
//! item numbers shown to users are one-based.

/// A window into an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Number of items to skip
    pub offset: u64,
    /// Maximum number of items to return, always greater than zero
    pub limit: u64,
}

/// One page of items together with the total count it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<T> {
    /// Items on this page, at most `limit` of them
    pub items: Vec<T>,
    /// Total number of items in the whole result set
    pub total_count: u64,
}

/// A navigation request coming from a Previous or Next button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Move one page back
    Previous,
    /// Move one page forward
    Next,
}

/// How Previous/Next behave at the first and last page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationPolicy {
    /// Stay on the boundary page
    #[default]
    Clamp,
    /// Jump from the last page to the first and vice versa
    Wrap,
}

impl NavigationPolicy {
    /// Returns the page index reached from `current` after applying `control`.
    #[must_use]
    pub const fn apply(self, current: u64, control: Control, total_pages: u64) -> u64 {
        let total_pages = if total_pages == 0 { 1 } else { total_pages };
        let last = total_pages - 1;
        let current = clamp_page(current, total_pages);
        match (self, control) {
            (Self::Clamp, Control::Previous) => current.saturating_sub(1),
            (Self::Clamp, Control::Next) => {
                if current < last {
                    current + 1
                } else {
                    last
                }
            }
            (Self::Wrap, Control::Previous) => (current + total_pages - 1) % total_pages,
            (Self::Wrap, Control::Next) => (current + 1) % total_pages,
        }
    }
}

/// Enabled state of the navigation buttons attached to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// Whether the Previous button is disabled
    pub previous_disabled: bool,
    /// Whether the Next button is disabled
    pub next_disabled: bool,
}

impl Controls {
    /// Controls for `page_index` out of `total_pages`.
    ///
    /// With [`NavigationPolicy::Clamp`] a button is disabled on the boundary it
    /// cannot move past. With [`NavigationPolicy::Wrap`] both stay enabled unless
    /// there is only one page.
    #[must_use]
    pub const fn for_page(page_index: u64, total_pages: u64, policy: NavigationPolicy) -> Self {
        let single = total_pages <= 1;
        match policy {
            NavigationPolicy::Clamp => Self {
                previous_disabled: page_index == 0,
                next_disabled: single || page_index + 1 >= total_pages,
            },
            NavigationPolicy::Wrap => Self {
                previous_disabled: single,
                next_disabled: single,
            },
        }
    }

    /// Both buttons disabled, used once a session is closed.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            previous_disabled: true,
            next_disabled: true,
        }
    }
}

/// Number of pages needed to show `total_count` items, never less than one.
#[must_use]
pub const fn total_pages(total_count: u64, page_size: u64) -> u64 {
    let page_size = if page_size == 0 { 1 } else { page_size };
    let pages = total_count.div_ceil(page_size);
    if pages == 0 { 1 } else { pages }
}

/// Clamps a page index into `0..total_pages`.
#[must_use]
pub const fn clamp_page(page_index: u64, total_pages: u64) -> u64 {
    if total_pages == 0 {
        0
    } else if page_index >= total_pages {
        total_pages - 1
    } else {
        page_index
    }
}

/// The window for `page_index` when pages hold `page_size` items.
#[must_use]
pub const fn page_request(page_index: u64, page_size: u64) -> PageRequest {
    PageRequest {
        offset: page_index.saturating_mul(page_size),
        limit: page_size,
    }
}

/// What a renderer gets to see: the items of one page plus where that page sits.
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a, T> {
    /// Items on the page
    pub items: &'a [T],
    /// Zero-based index of the page
    pub page_index: u64,
    /// Total number of pages in the session
    pub total_pages: u64,
    /// Total number of items, as counted at session start
    pub total_count: u64,
    /// Page size the session was created with
    pub page_size: u64,
}

impl<T> PageView<'_, T> {
    /// One-based position of the first item on this page.
    #[must_use]
    pub const fn first_item_number(&self) -> u64 {
        self.page_index * self.page_size + 1
    }

    /// One-based position of the last item on this page.
    #[must_use]
    pub const fn last_item_number(&self) -> u64 {
        self.page_index * self.page_size + self.items.len() as u64
    }

    /// One-based global rank of the item at `index` within this page.
    #[must_use]
    pub const fn rank_of(&self, index: usize) -> u64 {
        self.page_index * self.page_size + index as u64 + 1
    }

    /// One-based page number for footers.
    #[must_use]
    pub const fn page_number(&self) -> u64 {
        self.page_index + 1
    }
}

//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Debt tracking commands
pub mod debt;

/// ELO leaderboard command
pub mod leaderboard;

/// Match history and match detail commands
pub mod matches;

use crate::{
    core::pagination::PageView,
    errors::{Error, Result},
};

// Export commands
pub use debt::*;
pub use leaderboard::*;
pub use matches::*;

/// Embed accent colors.
pub(crate) mod colors {
    pub const GOLD: u32 = 0xFF_D7_00;
    pub const BLUE: u32 = 0x00_99_FF;
    pub const GREEN: u32 = 0x00_FF_00;
    pub const ORANGE_RED: u32 = 0xFF_45_00;
}

/// Reads an id chosen through autocomplete.
pub(crate) fn parse_id(value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::InvalidSelection {
            value: value.to_string(),
        })
}

/// `Page i/n` footer text.
pub(crate) fn page_footer<T>(page: &PageView<'_, T>) -> String {
    format!("Page {}/{}", page.page_number(), page.total_pages)
}

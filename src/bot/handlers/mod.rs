//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions other than the
//! commands themselves, such as autocomplete.

/// Autocomplete handlers for player and match options
pub mod autocomplete;

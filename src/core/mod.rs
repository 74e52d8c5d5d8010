//! Core business logic - framework-agnostic players, matches, debts and pagination.
//!
//! Nothing in here depends on Discord. The bot layer renders what these
//! modules return and plugs a Discord channel into [`pagination::Paginator`].

/// Who owes what for which match
pub mod debt;
/// Match scheduling, line-ups and history
pub mod matches;
/// Interactive pagination sessions
pub mod pagination;
/// Player lookups and the leaderboard
pub mod player;

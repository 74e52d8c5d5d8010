//! Entity module - Contains all SeaORM entity definitions for the database.
//! Players take part in matches through `player_match` rows, which also record
//! which team they played for and whether they paid their share.

pub mod matches;
pub mod player;
pub mod player_match;

// Re-export specific types to avoid conflicts
pub use matches::{Entity as Match, Model as MatchModel};
pub use player::Entity as Player;
pub use player_match::Entity as PlayerMatch;

//! Player entity - A regular of the weekly games.
//!
//! ELO, match count and wins are maintained outside the bot and only read here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Player database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "players")]
pub struct Model {
    /// Unique identifier for the player
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Current ELO rating
    pub elo: f64,
    /// Number of matches played
    pub matches: i32,
    /// Number of matches won
    pub wins: i32,
}

/// Defines relationships between Player and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One player has many match participations
    #[sea_orm(has_many = "super::player_match::Entity")]
    PlayerMatches,
}

impl Related<super::player_match::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayerMatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

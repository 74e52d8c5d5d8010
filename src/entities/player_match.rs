//! Participation entity - Links a player to a match.
//!
//! Each row carries the team the player was on and whether they have paid
//! their share of the pitch price.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Participation database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "player_matches")]
pub struct Model {
    /// Unique identifier for the participation
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Player who took part
    pub player_id: i64,
    /// Match they took part in
    pub match_id: i64,
    /// Team label (e.g. "A", "B")
    pub team: String,
    /// Whether the player's share has been paid
    pub paid: bool,
}

/// Defines relationships between participations and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each participation belongs to one player
    #[sea_orm(
        belongs_to = "super::player::Entity",
        from = "Column::PlayerId",
        to = "super::player::Column::Id"
    )]
    Player,
    /// Each participation belongs to one match
    #[sea_orm(
        belongs_to = "super::matches::Entity",
        from = "Column::MatchId",
        to = "super::matches::Column::Id"
    )]
    Match,
}

impl Related<super::player::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl Related<super::matches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Match.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

//! Match entity - One scheduled game with its pitch price and final result.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Match database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    /// Unique identifier for the match
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Day the match is played
    pub date: Date,
    /// Kick-off time as entered by the organiser (e.g. "21:00")
    pub time: String,
    /// Pitch or venue
    pub location: String,
    /// Total pitch price, split evenly between the players
    pub price: f64,
    /// Final score, once known
    pub result: Option<String>,
}

/// Defines relationships between Match and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One match has many participants
    #[sea_orm(has_many = "super::player_match::Entity")]
    PlayerMatches,
}

impl Related<super::player_match::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlayerMatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

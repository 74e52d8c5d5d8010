//! Unified error type for `MatchdayBuddy`.
//!
//! Only construction and delivery failures of a pagination session surface here as
//! hard errors. Navigation failures inside a live session are absorbed by the
//! paginator and reported to the user as transient notices.

use thiserror::Error;

/// Every failure the bot can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Error raised by the `SeaORM` layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (config file, data directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Failure while writing a reply into a string buffer
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Error raised by serenity or poise
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),

    /// A paginator was configured with a page size of zero
    #[error("Invalid page size {page_size}: must be greater than zero")]
    InvalidPageSize {
        /// The rejected page size
        page_size: u64,
    },

    /// A paginator was configured with a zero-length session timeout
    #[error("Invalid session timeout: must be greater than zero")]
    InvalidSessionTimeout,

    /// The first page of a pagination session could not be posted
    #[error("Failed to deliver paginated message: {message}")]
    Delivery {
        /// Description of the underlying failure
        message: String,
    },

    /// No player with the given id
    #[error("Player {id} not found")]
    PlayerNotFound {
        /// Player id that was looked up
        id: i64,
    },

    /// No match with the given id
    #[error("Match {id} not found")]
    MatchNotFound {
        /// Match id that was looked up
        id: i64,
    },

    /// The player exists but did not take part in the match
    #[error("No record found for {player_name} in the match on {date} at {location}")]
    PlayerNotInMatch {
        /// Player id
        player_id: i64,
        /// Match id
        match_id: i64,
        /// Name of the player, for the reply
        player_name: String,
        /// Day of the match
        date: chrono::NaiveDate,
        /// Where the match was played
        location: String,
    },

    /// An autocomplete value that does not parse as an id
    #[error("Invalid selection: {value}")]
    InvalidSelection {
        /// The raw option value
        value: String,
    },
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Wraps any failure that prevented the first page from being delivered.
    #[must_use]
    pub fn delivery(source: &Self) -> Self {
        Self::Delivery {
            message: source.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

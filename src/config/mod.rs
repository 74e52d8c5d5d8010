/// Database configuration and connection management
pub mod database;

/// Page sizes and session timeouts from config.toml
pub mod settings;

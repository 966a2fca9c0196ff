/// Database configuration and connection management
pub mod database;

/// Server and cart settings loaded from config.toml and the environment
pub mod settings;

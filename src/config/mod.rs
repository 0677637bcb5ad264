/// Database configuration and connection management
pub mod database;

/// Explanation settings from environment variables
pub mod env;

/// Scenario loading from config.toml
pub mod scenario;

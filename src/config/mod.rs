//! Configuration module.
//!
//! Supports JSON configuration files, environment variable overrides, and
//! compiled-in defaults.
//!
//! # Module Structure
//!
//! - [`crate::config::types`]: Root `Config` struct
//! - [`server`]: Connection and broadcast behavior
//! - [`security`]: CORS and token-verification settings
//! - [`logging`]: Logging configuration
//! - [`crate::config::loader`]: Configuration loading functions
//! - [`crate::config::validation`]: Configuration validation functions
//! - [`crate::config::defaults`]: Default value functions

pub mod defaults;
pub mod loader;
pub mod logging;
pub mod security;
pub mod server;
pub mod types;
pub mod validation;

pub use loader::load;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use security::SecurityConfig;
pub use server::{BroadcastSection, ServerSection};
pub use types::{Config, DirectoryEntry};
pub use validation::validate_config_security;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();

        assert_eq!(config.port, 3702);
        assert_eq!(config.broadcast.period_ms, 50);
        assert_eq!(config.server.max_message_size, 16384);
        assert_eq!(config.server.queue_capacity, 64);
        assert_eq!(config.security.cors_origins, "*");
        assert!(config.security.token_secret.is_empty());
        assert!(config.directory.is_empty());

        assert_eq!(config.logging.dir, "logs");
        assert_eq!(config.logging.filename, "server.log");
        assert_eq!(config.logging.rotation, "daily");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.port, deserialized.port);
        assert_eq!(config.broadcast.period_ms, deserialized.broadcast.period_ms);
        assert_eq!(
            config.server.max_message_size,
            deserialized.server.max_message_size
        );
    }

    #[test]
    fn test_directory_entries_deserialize() {
        let json = r#"{
            "directory": [
                { "id": 1, "name": "Bob", "role": "admin" },
                { "id": 2, "name": "Alice", "role": "citizen" }
            ]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.directory.len(), 2);
        assert_eq!(config.directory[0].name, "Bob");
        assert_eq!(config.directory[1].role, "citizen");
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        let parsed: LogLevel = serde_json::from_str(r#""warning""#).unwrap();
        assert_eq!(parsed, LogLevel::Warn);
        assert!(serde_json::from_str::<LogLevel>(r#""loud""#).is_err());
    }
}

//! Root configuration types.

use super::defaults::default_port;
use super::logging::LoggingConfig;
use super::security::SecurityConfig;
use super::server::{BroadcastSection, ServerSection};
use serde::{Deserialize, Serialize};

use crate::protocol::UserId;

/// Root configuration struct for the live server.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub broadcast: BroadcastSection,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Identity seed for the in-memory user directory. A deployment backed
    /// by the real account store leaves this empty.
    #[serde(default)]
    pub directory: Vec<DirectoryEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            server: ServerSection::default(),
            broadcast: BroadcastSection::default(),
            security: SecurityConfig::default(),
            logging: LoggingConfig::default(),
            directory: Vec::new(),
        }
    }
}

/// One seeded identity for the in-memory user directory.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DirectoryEntry {
    pub id: UserId,
    pub name: String,
    pub role: String,
}

//! Security and authentication configuration types.

use super::defaults::default_cors_origins;
use serde::{Deserialize, Serialize};

/// Security configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Allowed CORS origins (comma-separated, or "*" for any)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    /// Shared secret for bearer-token verification. Upgrades are refused
    /// outright when this is empty (no token can verify against it).
    #[serde(default)]
    pub token_secret: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: default_cors_origins(),
            token_secret: String::new(),
        }
    }
}

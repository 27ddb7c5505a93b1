//! Default value functions used by serde `#[serde(default = ...)]`
//! attributes across the configuration types.

use super::logging::LogFormat;

// =============================================================================
// Port & Root Config
// =============================================================================

pub const fn default_port() -> u16 {
    3702
}

// =============================================================================
// Server Defaults
// =============================================================================

/// Maximum size of a single inbound WebSocket frame.
pub const fn default_max_message_size() -> usize {
    16384 // 16KB; state records are 52 bytes, chat lines are short
}

/// Outbound frame queue depth per connection.
pub const fn default_queue_capacity() -> usize {
    64
}

// =============================================================================
// Broadcast Defaults
// =============================================================================

/// State broadcast cadence in milliseconds.
pub const fn default_broadcast_period_ms() -> u64 {
    50
}

// =============================================================================
// Security Defaults
// =============================================================================

pub fn default_cors_origins() -> String {
    "*".to_string()
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "server.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Text
}

#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

//! # World Live Server
//!
//! The real-time layer of a multi-user 3D virtual-world platform: WebSocket
//! channels for world chat, private chat, entity-state streaming, and
//! world-content change notifications, all behind signed bearer-token
//! authentication.
//!
//! Entity transforms travel in a fixed 52-byte binary record with an
//! explicit endianness cue; a periodic scheduler coalesces the latest state
//! per client and broadcasts one batched pack per world per tick.

/// Bearer-token verification for socket upgrades
pub mod auth;

/// Channel registries, chat routing, state buffers, broadcast scheduler
pub mod channels;

/// Binary entity-state wire format
pub mod codec;

/// Server configuration and environment variables
pub mod config;

/// User-identity lookup for chat formatting
pub mod directory;

/// Structured logging configuration
pub mod logging;

/// Channel kinds, scopes, and chat message shape
pub mod protocol;

/// Shared server state for the HTTP layer
pub mod server;

/// WebSocket routes, handshake authorization, and socket tasks
pub mod websocket;

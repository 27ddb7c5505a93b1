//! WebSocket layer: route table, handshake authorization, and per-socket
//! connection tasks.

mod connection;
mod handler;
mod routes;

pub use routes::{create_router, run_server};

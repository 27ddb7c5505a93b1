use axum::extract::State;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;

use super::handler::{
    user_chat_handler, world_chat_handler, world_state_handler, world_update_handler,
};
use crate::auth::HmacTokenVerifier;
use crate::channels::ChannelManager;
use crate::config::Config;
use crate::directory::InMemoryUserDirectory;
use crate::server::{LiveServer, ServerLimits};

/// Create the Axum router with the four live-channel upgrade endpoints.
pub fn create_router(cors_origins: &str) -> axum::Router<Arc<LiveServer>> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    axum::Router::new()
        .route("/api/worlds/{id}/ws/chat", get(world_chat_handler))
        .route("/api/worlds/{id}/ws/state", get(world_state_handler))
        .route("/api/worlds/{id}/ws/update", get(world_update_handler))
        .route("/api/users/{id}/ws/chat", get(user_chat_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
async fn health_check(
    State(server): State<Arc<LiveServer>>,
) -> axum::response::Result<&'static str> {
    if server.health_check() {
        Ok("OK")
    } else {
        Err(axum::http::StatusCode::SERVICE_UNAVAILABLE.into())
    }
}

/// Build the full server from a loaded config and serve it until the
/// process is stopped.
pub async fn run_server(addr: SocketAddr, config: Config) -> anyhow::Result<()> {
    let directory = Arc::new(InMemoryUserDirectory::from_entries(&config.directory));
    let verifier = Arc::new(HmacTokenVerifier::new(&config.security.token_secret));
    let channels = ChannelManager::new(
        directory,
        std::time::Duration::from_millis(config.broadcast.period_ms),
    );
    channels.start_broadcast();

    let server = LiveServer::new(
        channels,
        verifier,
        ServerLimits {
            max_message_size: config.server.max_message_size,
            queue_capacity: config.server.queue_capacity,
        },
    );

    let app = create_router(&config.security.cors_origins).with_state(server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Starting world live server");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

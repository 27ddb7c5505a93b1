use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

use super::connection::handle_socket;
use crate::auth::VerifiedUser;
use crate::protocol::{ChannelKind, ChannelScope};
use crate::server::LiveServer;

/// `token` query parameter, the header-less fallback for browser clients
/// that cannot attach an `Authorization` header to an upgrade request.
#[derive(Debug, Deserialize)]
pub(super) struct TokenQuery {
    token: Option<String>,
}

pub(super) async fn world_chat_handler(
    ws: WebSocketUpgrade,
    Path(world): Path<u32>,
    Query(query): Query<TokenQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(server): State<Arc<LiveServer>>,
    headers: HeaderMap,
) -> Response {
    upgrade(
        ws,
        server,
        ChannelScope::new(ChannelKind::WorldChat, world),
        &headers,
        query,
        addr,
    )
    .await
}

pub(super) async fn world_state_handler(
    ws: WebSocketUpgrade,
    Path(world): Path<u32>,
    Query(query): Query<TokenQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(server): State<Arc<LiveServer>>,
    headers: HeaderMap,
) -> Response {
    upgrade(
        ws,
        server,
        ChannelScope::new(ChannelKind::WorldState, world),
        &headers,
        query,
        addr,
    )
    .await
}

pub(super) async fn world_update_handler(
    ws: WebSocketUpgrade,
    Path(world): Path<u32>,
    Query(query): Query<TokenQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(server): State<Arc<LiveServer>>,
    headers: HeaderMap,
) -> Response {
    upgrade(
        ws,
        server,
        ChannelScope::new(ChannelKind::WorldUpdate, world),
        &headers,
        query,
        addr,
    )
    .await
}

pub(super) async fn user_chat_handler(
    ws: WebSocketUpgrade,
    Path(user): Path<u32>,
    Query(query): Query<TokenQuery>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(server): State<Arc<LiveServer>>,
    headers: HeaderMap,
) -> Response {
    upgrade(
        ws,
        server,
        ChannelScope::new(ChannelKind::UserChat, user),
        &headers,
        query,
        addr,
    )
    .await
}

/// Authorize the handshake and complete the protocol upgrade. Token
/// verification happens before `on_upgrade`; a refused handshake never
/// produces a half-open socket.
async fn upgrade(
    ws: WebSocketUpgrade,
    server: Arc<LiveServer>,
    scope: ChannelScope,
    headers: &HeaderMap,
    query: TokenQuery,
    addr: SocketAddr,
) -> Response {
    let user = match authorize(&server, headers, query).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    tracing::debug!(
        channel = scope.kind.as_str(),
        scope_id = scope.id,
        user_id = user.user_id,
        client_addr = %addr,
        "WebSocket upgrade authorized"
    );
    ws.on_upgrade(move |socket| handle_socket(socket, server, scope, user, addr))
}

/// Extract the bearer token (header first, `?token=` fallback) and verify
/// it. No usable token yields 401, a failing token yields 403.
async fn authorize(
    server: &LiveServer,
    headers: &HeaderMap,
    query: TokenQuery,
) -> Result<VerifiedUser, Response> {
    let header_token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let token = match header_token {
        Some(token) if !token.is_empty() => token.to_owned(),
        _ => match query.token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(StatusCode::UNAUTHORIZED.into_response()),
        },
    };

    match server.verifier().verify(&token).await {
        Ok(user) => Ok(user),
        Err(err) => {
            tracing::debug!(error = %err, "Token verification failed");
            Err(StatusCode::FORBIDDEN.into_response())
        }
    }
}

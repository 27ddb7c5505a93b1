use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::auth::VerifiedUser;
use crate::channels::{Connection, Frame};
use crate::protocol::{ChannelKind, ChannelScope};
use crate::server::LiveServer;

pub(super) async fn handle_socket(
    socket: WebSocket,
    server: Arc<LiveServer>,
    scope: ChannelScope,
    user: VerifiedUser,
    addr: SocketAddr,
) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Frame>(server.limits().queue_capacity);
    let cancel = CancellationToken::new();
    let conn = Connection::new(tx, cancel.clone());
    let serial = conn.serial();

    // A user-chat socket opened against someone else's channel is kept
    // alive without registering anywhere: it may send into that channel
    // but has no presence of its own.
    let unregistered = register(&server, scope, &user, conn);
    tracing::info!(
        channel = scope.kind.as_str(),
        scope_id = scope.id,
        user_id = user.user_id,
        client_addr = %addr,
        registered = unregistered.is_none(),
        "WebSocket connection established"
    );

    // Drain the outbound queue into the socket until every sender handle
    // is gone (slot vacated or replaced) or the peer goes away.
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let message = match frame {
                Frame::Text(text) => Message::Text(text.as_ref().into()),
                Frame::Binary(bytes) => Message::Binary(bytes),
            };
            if sink.send(message).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let max_message_size = server.limits().max_message_size;
    loop {
        let msg = tokio::select! {
            () = cancel.cancelled() => break,
            msg = stream.next() => match msg {
                Some(Ok(msg)) => msg,
                Some(Err(err)) => {
                    tracing::debug!(user_id = user.user_id, error = %err, "WebSocket error");
                    break;
                }
                None => break,
            },
        };

        match msg {
            Message::Text(text) => {
                if text.len() > max_message_size {
                    tracing::warn!(
                        user_id = user.user_id,
                        size = text.len(),
                        limit = max_message_size,
                        "Closing connection, text frame exceeds size limit"
                    );
                    break;
                }
                dispatch_text(&server, scope, &user, &text).await;
            }
            Message::Binary(data) => {
                if data.len() > max_message_size {
                    tracing::warn!(
                        user_id = user.user_id,
                        size = data.len(),
                        limit = max_message_size,
                        "Closing connection, binary frame exceeds size limit"
                    );
                    break;
                }
                dispatch_binary(&server, scope, &user, &data).await;
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    // Vacate our slot only if this connection instance still occupies it;
    // a replacement that arrived meanwhile keeps its slot.
    if unregistered.is_none() {
        server.channels().detach(scope, user.user_id, serial);
    }
    drop(unregistered);
    cancel.cancel();
    let _ = send_task.await;
    tracing::debug!(
        channel = scope.kind.as_str(),
        scope_id = scope.id,
        user_id = user.user_id,
        "WebSocket connection closed"
    );
}

/// Register the connection into the table its scope names. Returns the
/// connection back instead when the scope registers nothing (a user-chat
/// socket for a foreign user's channel).
fn register(
    server: &LiveServer,
    scope: ChannelScope,
    user: &VerifiedUser,
    conn: Connection,
) -> Option<Connection> {
    let channels = server.channels();
    match scope.kind {
        ChannelKind::WorldChat => {
            channels.add_world_chat_connection(scope.id, conn, user.user_id);
            None
        }
        ChannelKind::WorldState => {
            channels.add_world_state_connection(scope.id, conn, user.user_id);
            None
        }
        ChannelKind::WorldUpdate => {
            channels.add_world_update_connection(scope.id, conn, user.user_id);
            None
        }
        ChannelKind::UserChat => {
            if scope.id == user.user_id {
                channels.add_user_chat_connection(conn, user.user_id);
                None
            } else {
                Some(conn)
            }
        }
    }
}

async fn dispatch_text(server: &LiveServer, scope: ChannelScope, user: &VerifiedUser, text: &str) {
    match scope.kind {
        ChannelKind::WorldChat => {
            if let Err(err) = server
                .channels()
                .send_world_chat_message(user.user_id, scope.id, text)
                .await
            {
                tracing::warn!(
                    user_id = user.user_id,
                    world = scope.id,
                    error = %err,
                    "World chat message rejected"
                );
            }
        }
        ChannelKind::UserChat => {
            if let Err(err) = server
                .channels()
                .send_user_chat_message(user.user_id, scope.id, text)
                .await
            {
                tracing::warn!(
                    user_id = user.user_id,
                    recipient = scope.id,
                    error = %err,
                    "User chat message rejected"
                );
            }
        }
        ChannelKind::WorldState | ChannelKind::WorldUpdate => {
            tracing::debug!(
                channel = scope.kind.as_str(),
                user_id = user.user_id,
                "Ignoring text frame on binary channel"
            );
        }
    }
}

async fn dispatch_binary(
    server: &LiveServer,
    scope: ChannelScope,
    user: &VerifiedUser,
    data: &[u8],
) {
    match scope.kind {
        ChannelKind::WorldState => {
            if let Err(err) = server
                .channels()
                .update_world_state(user.user_id, scope.id, data)
                .await
            {
                tracing::warn!(
                    user_id = user.user_id,
                    world = scope.id,
                    error = %err,
                    "Entity state update rejected"
                );
            }
        }
        ChannelKind::WorldChat | ChannelKind::WorldUpdate | ChannelKind::UserChat => {
            tracing::debug!(
                channel = scope.kind.as_str(),
                user_id = user.user_id,
                "Ignoring binary frame"
            );
        }
    }
}

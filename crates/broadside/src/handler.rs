//! Per-connection handler: authentication, registration, message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   0. Finish the WebSocket upgrade
//!   1. Authenticate the credential captured during the upgrade
//!   2. Register the identity and send `connection_success`
//!   3. Spawn a writer task that drains the player's outbound queue
//!   4. Loop: receive frames → decode → hand to the lobby → dispatch
//!
//! Refusals (bad token, duplicate identity) get one `connection_error`
//! frame and a close.

use std::sync::Arc;

use broadside_game::Outcome;
use broadside_protocol::{ClientMessage, Codec, ServerMessage};
use broadside_session::{
    AuthError, Identity, IdentityVerifier, UserDirectory, authenticate,
};
use broadside_transport::{
    Connection, Handshake, PendingWebSocket, WebSocketConnection,
};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::{BroadsideError, GameRecorder};

/// Drop guard that runs the disconnect path when the handler exits.
///
/// Runs whether the handler returns normally, errors out, or panics.
/// `Drop` is synchronous, so the cleanup is spawned onto the runtime.
struct SessionGuard<V: IdentityVerifier, D: UserDirectory, R: GameRecorder> {
    username: String,
    state: Arc<ServerState<V, D, R>>,
}

impl<V: IdentityVerifier, D: UserDirectory, R: GameRecorder> Drop
    for SessionGuard<V, D, R>
{
    fn drop(&mut self) {
        let username = std::mem::take(&mut self.username);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut hub = state.hub.lock().await;
            let outcome = hub.lobby.disconnect(&username);
            hub.registry.unregister(&username);
            hub.dispatch(outcome, &state.recorder);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<V, D, R>(
    pending: PendingWebSocket,
    state: Arc<ServerState<V, D, R>>,
) -> Result<(), BroadsideError>
where
    V: IdentityVerifier,
    D: UserDirectory,
    R: GameRecorder,
{
    let peer = pending.peer_addr();
    let conn = match pending.complete().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::debug!(%peer, error = %e, "WebSocket upgrade failed");
            return Err(e.into());
        }
    };
    let conn_id = conn.id();
    tracing::debug!(%conn_id, %peer, "handling new connection");

    // --- Step 1: Authenticate ---
    let identity = match authenticate(
        &state.verifier,
        &state.directory,
        conn.credential(),
    )
    .await
    {
        Ok(identity) => identity,
        Err(e) => {
            tracing::info!(%conn_id, error = %e, "authentication failed");
            refuse(&conn, &state.codec, &e).await;
            return Err(e.into());
        }
    };

    // --- Step 2: Register ---
    // The success frame is queued under the lock, so it precedes any
    // broadcast the player could otherwise see first.
    let (tx, rx) = mpsc::unbounded_channel();
    let registered = {
        let mut hub = state.hub.lock().await;
        hub.registry
            .register(identity.clone(), tx)
            .map(|player| {
                let _ = player.connection().send(ServerMessage::ConnectionSuccess {
                    username: player.username().to_string(),
                });
            })
    };
    if let Err(e) = registered {
        tracing::info!(%conn_id, username = %identity.username, "duplicate connection refused");
        refuse(&conn, &state.codec, &e).await;
        return Err(e.into());
    }

    let _guard = SessionGuard {
        username: identity.username.clone(),
        state: Arc::clone(&state),
    };
    tracing::info!(%conn_id, username = %identity.username, "player connected");

    // --- Step 3: Writer ---
    let conn = Arc::new(conn);
    tokio::spawn(write_outbound(Arc::clone(&conn), Arc::clone(&state), rx));

    // --- Step 4: Message loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(username = %identity.username, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(username = %identity.username, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    username = %identity.username, error = %e, "ignoring undecodable frame"
                );
                continue;
            }
        };
        tracing::debug!(username = %identity.username, kind = msg.kind(), "message received");

        let mut hub = state.hub.lock().await;
        let outcome = match msg {
            ClientMessage::JoinQueue {} => hub.lobby.join_queue(&identity),
            ClientMessage::LeaveQueue {} => hub.lobby.leave_queue(&identity.username),
            ClientMessage::ShipsData { ships } => {
                hub.lobby.submit_fleet(&identity.username, &ships)
            }
            ClientMessage::Attack { x, y } => {
                hub.lobby.attack(&identity.username, x, y)
            }
            ClientMessage::JoinFriend { friend_username } => {
                let friend = hub
                    .registry
                    .lookup(&friend_username)
                    .map(|p| p.identity().clone());
                hub.lobby.join_friend(&identity, friend.as_ref())
            }
            ClientMessage::Authenticate {} => already_authenticated(&identity),
            ClientMessage::Unknown => {
                tracing::debug!(username = %identity.username, "ignoring unknown message kind");
                continue;
            }
        };
        hub.dispatch(outcome, &state.recorder);
    }

    // _guard drops here → disconnect path fires.
    Ok(())
}

/// Drains `rx` into the socket until the queue closes or a send fails.
///
/// The queue closes once the player is unregistered, so anything
/// dispatched before that still goes out.
async fn write_outbound<V, D, R>(
    conn: Arc<WebSocketConnection>,
    state: Arc<ServerState<V, D, R>>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
) where
    V: IdentityVerifier,
    D: UserDirectory,
    R: GameRecorder,
{
    while let Some(msg) = rx.recv().await {
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed; writer stopping");
            break;
        }
    }
    let _ = conn.close().await;
}

/// Sends `connection_error` and closes. Best effort: the client may
/// already be gone.
async fn refuse(conn: &WebSocketConnection, codec: &impl Codec, error: &AuthError) {
    let frame = ServerMessage::ConnectionError {
        error: error.client_message().to_string(),
    };
    if let Ok(bytes) = codec.encode(&frame) {
        let _ = conn.send(&bytes).await;
    }
    let _ = conn.close().await;
}

fn already_authenticated(identity: &Identity) -> Outcome {
    let mut out = Outcome::new();
    out.send(
        &identity.username,
        ServerMessage::Error {
            message: "Already authenticated".into(),
        },
    );
    out
}

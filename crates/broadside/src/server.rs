//! `BroadsideServer` builder and accept loop.
//!
//! This is the entry point for running a Broadside server. It ties the
//! layers together: transport → protocol → session → game.

use std::collections::HashMap;
use std::sync::Arc;

use broadside_game::{Lobby, Outcome, RecordRequest};
use broadside_protocol::{GameId, JsonCodec, Recipient, ServerMessage};
use broadside_session::{IdentityVerifier, SessionRegistry, UserDirectory};
use broadside_transport::{Transport, WebSocketTransport};
use tokio::sync::{Mutex, mpsc};

use crate::handler::handle_connection;
use crate::recorder::{RecorderSender, spawn_recorder};
use crate::{BroadsideError, GameRecorder, ServerConfig};

/// Outbound queue for one player. A writer task drains it into the socket.
pub(crate) type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// Everything connections share, behind one lock.
///
/// Registration, matchmaking and gameplay all go through this mutex, so
/// two connections can never pair against the same waiting player or
/// register the same identity at once.
pub(crate) struct Hub {
    pub(crate) registry: SessionRegistry<PlayerSender>,
    pub(crate) lobby: Lobby,
    /// Recorder inboxes for games whose record is still open.
    recorders: HashMap<GameId, RecorderSender>,
}

impl Hub {
    fn new(lobby: Lobby) -> Self {
        Self {
            registry: SessionRegistry::new(),
            lobby,
            recorders: HashMap::new(),
        }
    }

    /// Carries out a lobby outcome: queues every message, then hands the
    /// record requests to their game's recorder.
    ///
    /// Messages are queued while the caller still holds the hub lock, so
    /// each player sees them in the order the lobby produced them.
    pub(crate) fn dispatch<R: GameRecorder>(
        &mut self,
        outcome: Outcome,
        recorder: &Arc<R>,
    ) {
        for (recipient, msg) in outcome.messages {
            match recipient {
                Recipient::All => {
                    for player in self.registry.players() {
                        let _ = player.connection().send(msg.clone());
                    }
                }
                Recipient::Player(username) => {
                    match self.registry.lookup(&username) {
                        Some(player) => {
                            if player.connection().send(msg).is_err() {
                                tracing::debug!(%username, "outbound queue closed");
                            }
                        }
                        None => {
                            tracing::debug!(%username, "message for unregistered player dropped");
                        }
                    }
                }
            }
        }

        for request in outcome.records {
            let game = request.game();
            let inbox = match &request {
                RecordRequest::Open { .. } => {
                    let tx = spawn_recorder(Arc::clone(recorder), game);
                    self.recorders.insert(game, tx.clone());
                    Some(tx)
                }
                RecordRequest::Complete { .. } | RecordRequest::Abandon { .. } => {
                    self.recorders.remove(&game)
                }
            };
            match inbox {
                Some(tx) => {
                    let _ = tx.send(request);
                }
                None => tracing::warn!(game_id = %game, "no recorder for game"),
            }
        }
    }
}

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<V, D, R> {
    pub(crate) hub: Mutex<Hub>,
    pub(crate) verifier: V,
    pub(crate) directory: D,
    pub(crate) recorder: Arc<R>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Broadside server.
///
/// # Example
///
/// ```rust,ignore
/// use broadside::prelude::*;
///
/// let server = BroadsideServer::builder()
///     .config(ServerConfig::from_env()?)
///     .build(my_verifier, my_directory, my_recorder)
///     .await?;
/// server.run().await
/// ```
pub struct BroadsideServerBuilder {
    config: ServerConfig,
    coin_seed: Option<u64>,
}

impl BroadsideServerBuilder {
    /// Creates a builder with [`ServerConfig::default`].
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            coin_seed: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Makes the first-turn coin flips reproducible.
    pub fn coin_seed(mut self, seed: u64) -> Self {
        self.coin_seed = Some(seed);
        self
    }

    /// Binds the listener and assembles the server.
    pub async fn build<V, D, R>(
        self,
        verifier: V,
        directory: D,
        recorder: R,
    ) -> Result<BroadsideServer<V, D, R>, BroadsideError>
    where
        V: IdentityVerifier,
        D: UserDirectory,
        R: GameRecorder,
    {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let lobby = match self.coin_seed {
            Some(seed) => Lobby::with_seed(seed),
            None => Lobby::new(),
        };

        let state = Arc::new(ServerState {
            hub: Mutex::new(Hub::new(lobby)),
            verifier,
            directory,
            recorder: Arc::new(recorder),
            codec: JsonCodec,
        });

        Ok(BroadsideServer { transport, state })
    }
}

impl Default for BroadsideServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Broadside server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BroadsideServer<V, D, R> {
    transport: WebSocketTransport,
    state: Arc<ServerState<V, D, R>>,
}

impl BroadsideServer<(), (), ()> {
    /// Creates a new builder. The collaborator types are fixed later, by
    /// [`BroadsideServerBuilder::build`].
    pub fn builder() -> BroadsideServerBuilder {
        BroadsideServerBuilder::new()
    }
}

impl<V, D, R> BroadsideServer<V, D, R>
where
    V: IdentityVerifier,
    D: UserDirectory,
    R: GameRecorder,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each socket is handed to its own task before the WebSocket upgrade,
    /// so a client that stalls mid-handshake holds up only itself.
    pub async fn run(mut self) -> Result<(), BroadsideError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Broadside server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(pending, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

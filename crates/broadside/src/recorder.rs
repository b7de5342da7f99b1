//! Durable game records.
//!
//! The server writes a record when two players are paired and closes it
//! when the game ends. Storage lives behind [`GameRecorder`]; this crate
//! ships no implementation.
//!
//! Each game gets its own recorder task fed by an unbounded channel, so
//! the create call always finishes before the completion or abandonment
//! for the same game, and the hub lock is never held across a storage
//! call. Failures are logged and otherwise ignored: the in-memory game is
//! authoritative.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use broadside_game::RecordRequest;
use broadside_protocol::{GameId, UserId};
use tokio::sync::mpsc;

/// Identifier the store assigns to a game record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionRecordId(pub String);

impl fmt::Display for SessionRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The final result of a game that was played out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub winner: UserId,
    pub loser: UserId,
    /// Whole seconds from battle start (or pairing) to the winning shot.
    pub duration_secs: u64,
}

/// A store call that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("persistence failure: {0}")]
pub struct PersistenceError(pub String);

/// Writes game records to durable storage.
///
/// # Example
///
/// ```rust
/// use broadside::prelude::*;
///
/// /// Keeps nothing.
/// struct Discard;
///
/// impl GameRecorder for Discard {
///     async fn create_session(
///         &self,
///         _player1: UserId,
///         _player2: UserId,
///     ) -> Result<SessionRecordId, PersistenceError> {
///         Ok(SessionRecordId("discarded".into()))
///     }
///
///     async fn complete_session(
///         &self,
///         _id: SessionRecordId,
///         _result: GameResult,
///     ) -> Result<(), PersistenceError> {
///         Ok(())
///     }
///
///     async fn abandon_session(
///         &self,
///         _id: SessionRecordId,
///     ) -> Result<(), PersistenceError> {
///         Ok(())
///     }
/// }
/// ```
pub trait GameRecorder: Send + Sync + 'static {
    /// Opens a record for a new pairing.
    fn create_session(
        &self,
        player1: UserId,
        player2: UserId,
    ) -> impl Future<Output = Result<SessionRecordId, PersistenceError>> + Send;

    /// Marks a record completed with its result.
    fn complete_session(
        &self,
        id: SessionRecordId,
        result: GameResult,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// Marks a record abandoned after a disconnect.
    fn abandon_session(
        &self,
        id: SessionRecordId,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Channel into one game's recorder task.
pub(crate) type RecorderSender = mpsc::UnboundedSender<RecordRequest>;

/// Starts the recorder task for `game` and returns its inbox.
///
/// The task ends after the first terminal request, or when the sender is
/// dropped.
pub(crate) fn spawn_recorder<R: GameRecorder>(
    recorder: Arc<R>,
    game: GameId,
) -> RecorderSender {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_recorder(recorder, game, rx));
    tx
}

async fn run_recorder<R: GameRecorder>(
    recorder: Arc<R>,
    game: GameId,
    mut rx: mpsc::UnboundedReceiver<RecordRequest>,
) {
    let mut record: Option<SessionRecordId> = None;

    while let Some(request) = rx.recv().await {
        match request {
            RecordRequest::Open { players, .. } => {
                match recorder.create_session(players[0], players[1]).await {
                    Ok(id) => {
                        tracing::debug!(game_id = %game, record_id = %id, "game record created");
                        record = Some(id);
                    }
                    Err(e) => {
                        tracing::warn!(game_id = %game, error = %e, "failed to create game record");
                    }
                }
            }
            RecordRequest::Complete {
                winner,
                loser,
                duration,
                ..
            } => {
                let Some(id) = record.take() else {
                    tracing::warn!(game_id = %game, "no game record to complete");
                    break;
                };
                let result = GameResult {
                    winner,
                    loser,
                    duration_secs: duration.as_secs(),
                };
                if let Err(e) = recorder.complete_session(id, result).await {
                    tracing::warn!(game_id = %game, error = %e, "failed to complete game record");
                }
                break;
            }
            RecordRequest::Abandon { .. } => {
                let Some(id) = record.take() else {
                    tracing::warn!(game_id = %game, "no game record to abandon");
                    break;
                };
                if let Err(e) = recorder.abandon_session(id).await {
                    tracing::warn!(game_id = %game, error = %e, "failed to abandon game record");
                }
                break;
            }
        }
    }
}

//! A runnable Broadside server for local play.
//!
//! Tokens are `<user_id>:<username>` in plain text, so anyone can be
//! anyone. Game records are only logged. Do not expose this to a network
//! you don't trust.
//!
//! ```text
//! PORT=3000 DEBUG=true cargo run -p battleship-server
//! websocat 'ws://127.0.0.1:3000/?token=1:alice'
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use broadside::prelude::*;

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Plain-text tokens backed by an in-memory account list.
///
/// An account is created the first time its id shows up in a token. After
/// that the stored username wins, whatever later tokens say.
#[derive(Clone, Default)]
struct DevAccounts {
    users: Arc<Mutex<HashMap<UserId, String>>>,
}

impl IdentityVerifier for DevAccounts {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let (id, name) = token
            .split_once(':')
            .ok_or_else(|| AuthError::InvalidToken("expected <id>:<username>".into()))?;
        let user_id = id
            .parse()
            .map(UserId)
            .map_err(|_| AuthError::InvalidToken(format!("bad user id {id:?}")))?;
        if name.is_empty() {
            return Err(AuthError::InvalidToken("empty username".into()));
        }

        let mut users = self
            .users
            .lock()
            .map_err(|_| AuthError::DirectoryUnavailable("account list poisoned".into()))?;
        users.entry(user_id).or_insert_with(|| name.to_string());

        Ok(Claims {
            user_id,
            username: name.to_string(),
            email: format!("{name}@localhost"),
        })
    }
}

impl UserDirectory for DevAccounts {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, AuthError> {
        let users = self
            .users
            .lock()
            .map_err(|_| AuthError::DirectoryUnavailable("account list poisoned".into()))?;
        Ok(users.get(&id).map(|username| UserRecord {
            id,
            username: username.clone(),
            email: format!("{username}@localhost"),
        }))
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Logs every record call and hands out sequential ids.
#[derive(Default)]
struct LogRecorder {
    next_id: AtomicU64,
}

impl GameRecorder for LogRecorder {
    async fn create_session(
        &self,
        player1: UserId,
        player2: UserId,
    ) -> Result<SessionRecordId, PersistenceError> {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let id = SessionRecordId(format!("session-{n}"));
        tracing::info!(record_id = %id, %player1, %player2, "session created");
        Ok(id)
    }

    async fn complete_session(
        &self,
        id: SessionRecordId,
        result: GameResult,
    ) -> Result<(), PersistenceError> {
        tracing::info!(
            record_id = %id,
            winner = %result.winner,
            loser = %result.loser,
            duration_secs = result.duration_secs,
            "session completed"
        );
        Ok(())
    }

    async fn abandon_session(&self, id: SessionRecordId) -> Result<(), PersistenceError> {
        tracing::info!(record_id = %id, "session abandoned");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), BroadsideError> {
    let config = ServerConfig::from_env()?;
    init_tracing(config.debug);

    let accounts = DevAccounts::default();
    let server = BroadsideServer::builder()
        .config(config)
        .build(accounts.clone(), accounts, LogRecorder::default())
        .await?;

    server.run().await
}

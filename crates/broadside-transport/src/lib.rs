//! Socket plumbing for Broadside.
//!
//! [`Transport`] hands out [`Handshake`]s that upgrade into
//! [`Connection`]s; a connection moves opaque frames and knows nothing
//! about the game. Players authenticate while
//! the connection is being established, so a connection also carries the
//! credential it was opened with ([`Connection::credential`]). Nothing
//! above this crate ever sees the upgrade request.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static LAST_CONNECTION_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique connection number, used only for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next id. Ids start at 1 and never repeat.
    pub fn next() -> Self {
        Self(LAST_CONNECTION_ID.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Source of new connections.
pub trait Transport: Send + Sync + 'static {
    type Pending: Handshake<Error = Self::Error>;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next client to open a socket.
    ///
    /// Returns before the upgrade, so one silent peer cannot hold up the
    /// clients behind it. An error here concerns one attempt only;
    /// callers keep accepting.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;
}

/// A client socket whose upgrade has not finished yet.
pub trait Handshake: Send + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Runs the upgrade. Waits as long as the peer does, so drive it from
    /// the connection's own task.
    async fn complete(self) -> Result<Self::Connection, Self::Error>;
}

/// One client's frame pipe.
///
/// All methods take `&self`: one task reads while another writes.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Writes one frame.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Reads the next frame, or `Ok(None)` once the peer has closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Starts the closing handshake.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    /// Bearer credential presented at connect time, if any.
    fn credential(&self) -> Option<&str>;
}

/// Picks the bearer credential out of a connect request.
///
/// The `token` query parameter wins; otherwise the second word of the
/// `Authorization` header is used (`Bearer <token>`). Empty values count
/// as absent.
pub fn extract_credential(
    query: Option<&str>,
    authorization: Option<&str>,
) -> Option<String> {
    let from_query = query.and_then(|q| {
        q.split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "token")
            .map(|(_, value)| value.to_string())
    });

    from_query
        .filter(|t| !t.is_empty())
        .or_else(|| {
            authorization
                .and_then(|h| h.split(' ').nth(1))
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_ids_increase() {
        let first = ConnectionId::next();
        let second = ConnectionId::next();
        assert!(second > first);
        assert!(first.get() >= 1);
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId(7).to_string(), "conn-7");
    }

    #[test]
    fn test_extract_credential_from_query() {
        let token = extract_credential(Some("foo=1&token=abc.def"), None);
        assert_eq!(token.as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_extract_credential_query_wins_over_header() {
        let token =
            extract_credential(Some("token=from-query"), Some("Bearer hdr"));
        assert_eq!(token.as_deref(), Some("from-query"));
    }

    #[test]
    fn test_extract_credential_from_bearer_header() {
        let token = extract_credential(None, Some("Bearer xyz"));
        assert_eq!(token.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_extract_credential_empty_query_falls_back_to_header() {
        let token = extract_credential(Some("token="), Some("Bearer xyz"));
        assert_eq!(token.as_deref(), Some("xyz"));
    }

    #[test]
    fn test_extract_credential_missing_returns_none() {
        assert_eq!(extract_credential(None, None), None);
        assert_eq!(extract_credential(Some("user=bob"), None), None);
        // A header with no second word carries no token.
        assert_eq!(extract_credential(None, Some("Bearer")), None);
    }
}

//! Error types for the session layer.

use broadside_protocol::UserId;

/// Why a connection could not be bound to an identity.
///
/// Every variant is fatal to the connection: the client gets one
/// `connection_error` frame carrying [`client_message`](Self::client_message)
/// and the socket is closed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The client connected without a token.
    #[error("no credential supplied")]
    MissingToken,

    /// The verifier rejected the token (bad signature, expired, garbled).
    #[error("invalid credential: {0}")]
    InvalidToken(String),

    /// The token was valid but the account no longer exists.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// The user directory could not be queried.
    #[error("user directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// The identity already has a live connection.
    #[error("user {0} already connected")]
    AlreadyConnected(String),
}

impl AuthError {
    /// The text sent to the client in `connection_error`.
    ///
    /// Deliberately coarse: verifier and directory internals stay in the
    /// server log.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::MissingToken => "Authentication required",
            Self::InvalidToken(_) | Self::DirectoryUnavailable(_) => {
                "Invalid authentication token"
            }
            Self::UserNotFound(_) => "User not found",
            Self::AlreadyConnected(_) => "User already connected",
        }
    }
}

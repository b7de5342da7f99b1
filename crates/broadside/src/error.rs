//! Unified error type for the Broadside server.

use broadside_protocol::ProtocolError;
use broadside_session::AuthError;
use broadside_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps the layer-specific errors.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors directly.
/// Fleet and gameplay errors never show up here: they are answered to the
/// player and the connection carries on.
#[derive(Debug, thiserror::Error)]
pub enum BroadsideError {
    /// Socket-level failure (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The connection could not be bound to an identity.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Bad server settings.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: BroadsideError = TransportError::BindFailed(io).into();
        assert!(matches!(err, BroadsideError::Transport(_)));
        assert!(err.to_string().contains("port taken"));
    }

    #[test]
    fn test_from_auth_error() {
        let err: BroadsideError = AuthError::MissingToken.into();
        assert!(matches!(err, BroadsideError::Auth(AuthError::MissingToken)));
    }

    #[test]
    fn test_from_config_error() {
        let err: BroadsideError = ConfigError::InvalidPort("abc".into()).into();
        assert!(matches!(err, BroadsideError::Config(_)));
        assert!(err.to_string().contains("abc"));
    }
}

/// Errors from the socket layer.
///
/// Only `BindFailed` is fatal to the server. The rest end a single
/// connection, or in the case of `AcceptFailed`, a single attempt.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be opened.
    #[error("bind failed: {0}")]
    BindFailed(#[source] std::io::Error),

    /// The TCP accept or the WebSocket upgrade failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// A frame could not be written.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// The peer went away without a close frame, or sent garbage.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}

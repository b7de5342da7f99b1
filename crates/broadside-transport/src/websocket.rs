//! WebSocket transport over `tokio-tungstenite`.
//!
//! Frames go out as text when they are valid UTF-8 (every JSON frame is)
//! and as binary otherwise. Ping and pong frames never reach the caller.

use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};

use crate::{
    Connection, ConnectionId, Handshake, Transport, TransportError,
    extract_credential,
};

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// TCP listener whose sockets are upgraded to WebSockets.
pub struct WebSocketTransport {
    listener: TcpListener,
}

impl WebSocketTransport {
    /// Opens the listener. `addr` is anything `TcpListener::bind` takes as
    /// a string, e.g. `"0.0.0.0:3000"`.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::BindFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }

    /// Actual bound address; differs from the requested one after binding
    /// port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Pending = PendingWebSocket;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Pending, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::debug!(%addr, "accepted TCP socket");
        Ok(PendingWebSocket { stream, addr })
    }
}

/// An accepted TCP socket that has not sent its upgrade request yet.
pub struct PendingWebSocket {
    stream: TcpStream,
    addr: SocketAddr,
}

impl PendingWebSocket {
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Handshake for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn complete(self) -> Result<Self::Connection, Self::Error> {
        let addr = self.addr;

        // The upgrade request is only visible inside the handshake
        // callback, so the credential is captured there.
        let mut credential = None;
        let ws = tokio_tungstenite::accept_hdr_async(
            self.stream,
            |req: &Request, resp: Response| {
                let authorization = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok());
                credential =
                    extract_credential(req.uri().query(), authorization);
                Ok(resp)
            },
        )
        .await
        .map_err(|e| {
            TransportError::AcceptFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                e,
            ))
        })?;

        let id = ConnectionId::next();
        tracing::debug!(
            %id,
            %addr,
            has_credential = credential.is_some(),
            "WebSocket upgrade complete"
        );

        let (sink, stream) = ws.split();
        Ok(WebSocketConnection {
            id,
            credential,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

/// An upgraded client socket.
///
/// Read and write halves sit behind separate locks, so a writer is never
/// blocked by a reader parked in [`recv`](Connection::recv).
pub struct WebSocketConnection {
    id: ConnectionId,
    credential: Option<String>,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::Text(text.to_owned().into()),
            Err(_) => Message::Binary(data.to_vec().into()),
        };
        self.sink.lock().await.send(msg).await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(data.into()));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }
}

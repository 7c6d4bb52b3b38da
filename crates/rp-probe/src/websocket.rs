//! WebSocket session against the Rust+ app port
//!
//! The game server serves the companion protocol over a plain WebSocket on
//! the app port. Opening the socket and completing a ping/pong round trip
//! proves the port is reachable and the server is speaking WebSocket, which
//! is all a liveness check needs; authenticated protocol requests belong to
//! the protocol client.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use rp_core::Credentials;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use crate::error::{ProbeError, ProbeResult};
use crate::session::{RemoteConnector, RemoteSession};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const PING_PAYLOAD: &[u8] = b"rustplus-bridge";

/// Creates [`WebSocketSession`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl RemoteConnector for WebSocketConnector {
    fn session(&self, credentials: &Credentials) -> Box<dyn RemoteSession> {
        Box::new(WebSocketSession::new(credentials))
    }
}

/// One WebSocket connection to a Rust+ server
pub struct WebSocketSession {
    url: String,
    stream: Mutex<Option<WsStream>>,
}

impl WebSocketSession {
    pub fn new(credentials: &Credentials) -> Self {
        Self {
            url: ws_url(&credentials.server, credentials.port),
            stream: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Build the socket URL, bracketing IPv6 literals
fn ws_url(server: &str, port: u16) -> String {
    if server.contains(':') && !server.starts_with('[') {
        format!("ws://[{}]:{}", server, port)
    } else {
        format!("ws://{}:{}", server, port)
    }
}

fn transport(context: &str, e: impl std::fmt::Display) -> ProbeError {
    ProbeError::Transport(format!("{}: {}", context, e))
}

#[async_trait]
impl RemoteSession for WebSocketSession {
    async fn connect(&self) -> ProbeResult<()> {
        debug!("Connecting to {}", self.url);
        let (stream, _response) = connect_async(&self.url)
            .await
            .map_err(|e| transport("connect failed", e))?;
        *self.stream.lock().await = Some(stream);
        Ok(())
    }

    async fn check_alive(&self) -> ProbeResult<()> {
        let mut guard = self.stream.lock().await;
        let stream = guard
            .as_mut()
            .ok_or_else(|| ProbeError::Transport("not connected".to_string()))?;

        stream
            .send(Message::Ping(PING_PAYLOAD.to_vec()))
            .await
            .map_err(|e| transport("ping failed", e))?;

        while let Some(message) = stream.next().await {
            match message.map_err(|e| transport("read failed", e))? {
                Message::Pong(payload) if payload == PING_PAYLOAD => return Ok(()),
                Message::Close(frame) => {
                    return Err(ProbeError::Transport(format!(
                        "server closed the connection: {:?}",
                        frame
                    )))
                }
                other => trace!("Skipping message while waiting for pong: {:?}", other),
            }
        }

        Err(ProbeError::Transport(
            "connection ended before pong".to_string(),
        ))
    }

    async fn disconnect(&self) -> ProbeResult<()> {
        if let Some(mut stream) = self.stream.lock().await.take() {
            stream
                .close(None)
                .await
                .map_err(|e| transport("close failed", e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url() {
        assert_eq!(ws_url("1.2.3.4", 28082), "ws://1.2.3.4:28082");
        assert_eq!(ws_url("rust.example.com", 28083), "ws://rust.example.com:28083");
        assert_eq!(ws_url("::1", 28082), "ws://[::1]:28082");
        assert_eq!(ws_url("[::1]", 28082), "ws://[::1]:28082");
    }

    #[tokio::test]
    async fn test_check_alive_requires_connect() {
        let session = WebSocketSession::new(&Credentials {
            server: "127.0.0.1".to_string(),
            port: 1,
            ..Default::default()
        });
        assert!(matches!(
            session.check_alive().await,
            Err(ProbeError::Transport(_))
        ));
        assert_eq!(session.disconnect().await, Ok(()));
    }
}

//! Probe a local WebSocket server end to end

use futures_util::StreamExt;
use rp_core::Credentials;
use rp_probe::{ProbeConfig, ProbeError, Prober, WebSocketConnector};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

fn credentials(port: u16) -> Credentials {
    Credentials {
        server: "127.0.0.1".to_string(),
        port,
        account_id: "76561198000000000".to_string(),
        session_token: "-1".to_string(),
    }
}

fn prober() -> Prober {
    Prober::with_config(
        Arc::new(WebSocketConnector),
        ProbeConfig {
            timeout: Duration::from_secs(5),
            settle: Duration::from_millis(20),
            teardown: Duration::from_secs(1),
        },
    )
}

#[tokio::test]
async fn test_probe_answers_with_pong() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        // Reading drives the automatic pong reply and the close handshake
        while let Some(Ok(_)) = ws.next().await {}
    });

    assert_eq!(prober().probe(&credentials(port)).await, Ok(()));
    server.await.unwrap();
}

#[tokio::test]
async fn test_probe_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = prober().probe(&credentials(port)).await;
    match result {
        Err(ProbeError::Transport(message)) => assert!(message.starts_with("connect failed")),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_probe_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    // Accept the TCP connection but never answer the WebSocket handshake
    let server = tokio::spawn(async move {
        let (_tcp, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
    });

    let prober = Prober::with_config(
        Arc::new(WebSocketConnector),
        ProbeConfig {
            timeout: Duration::from_millis(300),
            settle: Duration::from_millis(10),
            teardown: Duration::from_millis(100),
        },
    );
    let result = prober.probe(&credentials(port)).await;
    assert_eq!(result, Err(ProbeError::Timeout(Duration::from_millis(300))));
    server.abort();
}

//! Shared helpers for runtime integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use nextpaste_protocol::{Frame, FrameCodec};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

pub type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub const WAIT: Duration = Duration::from_secs(5);

/// Open a raw WebSocket to the sync server's `/ws` endpoint.
pub async fn connect(addr: SocketAddr) -> Ws {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");
    ws
}

pub async fn send(ws: &mut Ws, frame: bytes::Bytes) {
    ws.send(Message::Binary(frame)).await.expect("send frame");
}

/// Next binary frame, parsed with `codec`. Control frames are skipped.
pub async fn next_frame(ws: &mut Ws, codec: &FrameCodec) -> Frame {
    loop {
        let message = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Binary(data) = message {
            return codec.parse(data).expect("parse frame");
        }
    }
}

/// Poll `check` until it holds or the wait elapses.
pub async fn wait_until(what: &str, mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !check() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

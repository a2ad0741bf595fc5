//! Relay round trips over real loopback sockets.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use nextpaste_relay::{RelayServer, RelayTiming, serve};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn start() -> (RelayServer, SocketAddr, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let relay = RelayServer::new(RelayTiming::default());
    let cancel = CancellationToken::new();
    tokio::spawn(serve(listener, relay.clone(), cancel.clone()));
    (relay, addr, cancel)
}

async fn join(addr: SocketAddr, room: &str) -> Ws {
    let (ws, _) = connect_async(format!("ws://{addr}/ws/{room}")).await.unwrap();
    ws
}

async fn next_data(ws: &mut Ws) -> Message {
    loop {
        let message = tokio::time::timeout(WAIT, ws.next())
            .await
            .expect("timed out")
            .expect("stream ended")
            .expect("websocket error");
        if message.is_binary() || message.is_text() {
            return message;
        }
    }
}

async fn wait_for(relay: &RelayServer, room: &str, clients: usize) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while relay.rooms().client_count(room) != clients {
        assert!(
            tokio::time::Instant::now() < deadline,
            "room {room} never reached {clients}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn messages_stay_in_their_room_and_keep_their_kind() {
    let (relay, addr, cancel) = start().await;
    let mut a = join(addr, "team").await;
    let mut b = join(addr, "team").await;
    let mut outsider = join(addr, "other").await;
    wait_for(&relay, "team", 2).await;
    wait_for(&relay, "other", 1).await;

    a.send(Message::Binary(vec![0x4e, 0x50, 1, 2, 3].into()))
        .await
        .unwrap();
    assert_eq!(
        next_data(&mut b).await,
        Message::Binary(vec![0x4e, 0x50, 1, 2, 3].into())
    );

    b.send(Message::Text(r#"{"action":"HEARTBEAT"}"#.into()))
        .await
        .unwrap();
    assert_eq!(
        next_data(&mut a).await,
        Message::Text(r#"{"action":"HEARTBEAT"}"#.into())
    );

    let leaked = tokio::time::timeout(Duration::from_millis(200), next_data(&mut outsider)).await;
    assert!(leaked.is_err(), "message crossed rooms");

    let stats = relay.stats();
    assert_eq!(stats.total_rooms, 2);
    assert_eq!(stats.total_clients, 3);

    cancel.cancel();
}

#[tokio::test]
async fn empty_room_is_removed_when_last_client_leaves() {
    let (relay, addr, cancel) = start().await;
    let mut ws = join(addr, "solo").await;
    wait_for(&relay, "solo", 1).await;

    ws.close(None).await.unwrap();
    wait_for(&relay, "solo", 0).await;
    assert_eq!(relay.rooms().room_count(), 0);

    cancel.cancel();
}

#[tokio::test]
async fn shutdown_closes_clients() {
    let (relay, addr, cancel) = start().await;
    let mut ws = join(addr, "room").await;
    wait_for(&relay, "room", 1).await;

    cancel.cancel();

    let ended = tokio::time::timeout(WAIT, async {
        loop {
            match ws.next().await {
                None | Some(Err(_)) => break,
                Some(Ok(msg)) if msg.is_close() => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "client stayed connected after shutdown");
    assert_eq!(relay.stats().total_rooms, 0);
}

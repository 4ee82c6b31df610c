//! Integration tests: an in-process server driven by real WebSocket clients.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use goishi_server::{
    config::{AiSettings, ServerSettings},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, reasoning::DisabledReasoningBackend,
        repository::InMemoryRoomRepository, stats::DisabledStatsProvider,
    },
    ui::{AppState, Server},
};
use goishi_shared::{
    protocol::{
        ClientEvent, ClientFrame, Color, GameType, MovePayload, QuickMatchPayload, ServerEvent,
        ServerEventKind,
    },
    time::SystemClock,
};
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Server bound to an ephemeral port for the duration of a test
struct TestServer {
    addr: std::net::SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let settings = ServerSettings {
            ai: AiSettings {
                think_delay: Duration::ZERO,
                ..AiSettings::default()
            },
        };
        let state = AppState::build(
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(WebSocketMessagePusher::new()),
            Arc::new(DisabledReasoningBackend),
            Arc::new(DisabledStatsProvider),
            Arc::new(SystemClock),
            settings,
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            Server::new(Arc::new(state)).serve(listener).await.unwrap();
        });
        TestServer { addr, handle }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct TestClient {
    socket_id: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connects and waits for the `connected` greeting
    async fn connect(server: &TestServer) -> Self {
        let (stream, _) = connect_async(server.ws_url()).await.unwrap();
        let mut client = TestClient {
            socket_id: String::new(),
            stream,
        };
        let ServerEvent::Connected { socket_id } = client.recv().await else {
            panic!("first event must be connected");
        };
        client.socket_id = socket_id;
        client
    }

    async fn send(&mut self, event: ClientEvent) {
        let frame = ClientFrame::new(GameType::Renju, event);
        let json = serde_json::to_string(&frame).unwrap();
        self.stream.send(Message::Text(json.into())).await.unwrap();
    }

    async fn recv(&mut self) -> ServerEvent {
        loop {
            let msg = timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("timed out waiting for an event")
                .expect("stream closed")
                .unwrap();
            if let Message::Text(text) = msg {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    /// Skips events until one of `kind` arrives
    async fn recv_kind(&mut self, kind: ServerEventKind) -> ServerEvent {
        loop {
            let event = self.recv().await;
            if event.kind() == kind {
                return event;
            }
        }
    }

    /// Skips events until the `moved` with `move_number` arrives.
    /// Every member receives every move, including its own.
    async fn recv_move(&mut self, move_number: usize) -> ServerEvent {
        loop {
            let event = self.recv_kind(ServerEventKind::Moved).await;
            if matches!(event, ServerEvent::Moved { move_number: n, .. } if n == move_number) {
                return event;
            }
        }
    }

    async fn play(&mut self, room_id: &str, row: i32, col: i32) {
        self.send(ClientEvent::Move(MovePayload {
            room_id: room_id.to_string(),
            row,
            col,
            side: None,
        }))
        .await;
    }
}

/// Two clients paired through quick match; returns (black, white, room id)
async fn quick_match_pair(server: &TestServer) -> (TestClient, TestClient, String) {
    let mut first = TestClient::connect(server).await;
    let mut second = TestClient::connect(server).await;

    first.send(ClientEvent::QuickMatch(QuickMatchPayload::default())).await;
    assert_eq!(first.recv().await.kind(), ServerEventKind::Waiting);
    second.send(ClientEvent::QuickMatch(QuickMatchPayload::default())).await;

    let ServerEvent::Assigned { color, room_id } = first.recv_kind(ServerEventKind::Assigned).await else {
        unreachable!();
    };
    let ServerEvent::Assigned { color: other, .. } = second.recv_kind(ServerEventKind::Assigned).await else {
        unreachable!();
    };
    assert_ne!(color, other);
    first.recv_kind(ServerEventKind::GameStart).await;
    second.recv_kind(ServerEventKind::GameStart).await;

    if color == Color::Black {
        (first, second, room_id)
    } else {
        (second, first, room_id)
    }
}

#[tokio::test]
async fn test_quick_match_and_three_moves() {
    // テスト項目: クイックマッチで対局が始まり、三手が両者に同じ順序で届く
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut black, mut white, room_id) = quick_match_pair(&server).await;

    // when (操作):
    black.play(&room_id, 7, 7).await;
    white.recv_move(1).await;
    white.play(&room_id, 7, 8).await;
    black.recv_move(2).await;
    black.play(&room_id, 6, 7).await;

    // then (期待する結果):
    let expected_third = ServerEvent::Moved {
        row: 6,
        col: 7,
        side: Color::Black,
        socket_id: black.socket_id.clone(),
        move_number: 3,
    };
    assert_eq!(white.recv_move(3).await, expected_third);
    assert_eq!(black.recv_move(3).await, expected_third);
}

#[tokio::test]
async fn test_out_of_turn_move_is_answered_with_error() {
    // テスト項目: 手番でない着手には error が返り、盤面は変わらない
    // given (前提条件):
    let server = TestServer::start().await;
    let (_black, mut white, room_id) = quick_match_pair(&server).await;

    // when (操作):
    white.play(&room_id, 7, 7).await;

    // then (期待する結果):
    assert_eq!(white.recv().await, ServerEvent::error("it is not your turn"));
}

#[tokio::test]
async fn test_disconnect_aborts_game_for_opponent() {
    // テスト項目: 対局中に切断すると、相手に gameAborted が届く
    // given (前提条件):
    let server = TestServer::start().await;
    let (black, mut white, room_id) = quick_match_pair(&server).await;

    // when (操作):
    drop(black);

    // then (期待する結果):
    let ServerEvent::GameAborted { reason, .. } = white.recv_kind(ServerEventKind::GameAborted).await else {
        unreachable!();
    };
    assert_eq!(reason, "opponent left");
    let ServerEvent::PlayerLeft { room_data, .. } = white.recv_kind(ServerEventKind::PlayerLeft).await else {
        unreachable!();
    };
    assert_eq!(room_data.room_id, room_id);
    assert_eq!(room_data.players.len(), 1);
}

#[tokio::test]
async fn test_http_endpoints() {
    // テスト項目: ヘルスチェックと Room 詳細（存在しない場合は 404）
    // given (前提条件):
    let server = TestServer::start().await;
    let http = reqwest::Client::new();

    // when (操作):
    let health = http.get(server.http_url("/api/health")).send().await.unwrap();
    let rooms = http.get(server.http_url("/api/rooms")).send().await.unwrap();
    let missing = http.get(server.http_url("/api/rooms/nowhere")).send().await.unwrap();

    // then (期待する結果):
    assert_eq!(health.status(), reqwest::StatusCode::OK);
    assert_eq!(
        rooms.json::<Vec<serde_json::Value>>().await.unwrap(),
        Vec::<serde_json::Value>::new()
    );
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

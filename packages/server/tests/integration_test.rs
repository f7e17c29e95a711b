//! Integration tests for the Tandem server.
//!
//! Each test starts the real router on an ephemeral port and drives it over
//! WebSocket and HTTP like a browser client would.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tandem_server::{
    config::{CoordinatorConfig, ServerConfig},
    infrastructure::store::InMemoryMessageStore,
    ui::{AppState, Server},
};
use tandem_shared::time::SystemClock;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Helper struct to manage the in-process server lifecycle
struct TestServer {
    task: tokio::task::JoinHandle<()>,
    port: u16,
}

impl TestServer {
    /// Start a test server on an ephemeral port
    async fn start() -> Self {
        Self::start_with(ServerConfig::default()).await
    }

    async fn start_with(config: ServerConfig) -> Self {
        let state = Arc::new(AppState::new(
            &config,
            Arc::new(InMemoryMessageStore::new()),
            Arc::new(SystemClock),
        ));
        let router = Server::new(state).router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener.local_addr().unwrap().port();
        let task = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });
        TestServer { task, port }
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    fn ws_url(&self, path: &str) -> String {
        format!("ws://127.0.0.1:{}{}", self.port, path)
    }

    async fn connect_waiting_room(&self) -> WsStream {
        let (ws, _) = connect_async(self.ws_url("/api/waiting-room/websocket"))
            .await
            .expect("Failed to connect to waiting room");
        ws
    }

    async fn connect_room(&self, room_id: &str, user_id: &str, user_name: &str) -> WsStream {
        let url = self.ws_url(&format!(
            "/api/chat/room/{}/websocket?userId={}&userName={}",
            room_id, user_id, user_name
        ));
        let (ws, _) = connect_async(url).await.expect("Failed to connect to room");
        ws
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn send_json(ws: &mut WsStream, frame: Value) {
    ws.send(Message::text(frame.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Receive the next JSON text frame
async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = tokio::time::timeout(FRAME_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Connection closed")
            .expect("WebSocket error");
        match msg {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Unexpected frame: {:?}", other),
        }
    }
}

/// Wait until the server closes the connection
async fn expect_closed(ws: &mut WsStream) {
    loop {
        let msg = tokio::time::timeout(FRAME_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for close");
        match msg {
            None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
            Some(Ok(Message::Text(text))) => panic!("Unexpected frame before close: {}", text),
            Some(Ok(_)) => continue,
        }
    }
}

/// Pair two users through the waiting room and return the room id
async fn pair(server: &TestServer, first: (&str, &str), second: (&str, &str)) -> String {
    let mut ws1 = server.connect_waiting_room().await;
    send_json(
        &mut ws1,
        json!({"type": "join", "userId": first.0, "userName": first.1}),
    )
    .await;
    let waiting = next_json(&mut ws1).await;
    assert_eq!(waiting["type"], "waiting");
    assert_eq!(waiting["position"], 1);

    let mut ws2 = server.connect_waiting_room().await;
    send_json(
        &mut ws2,
        json!({"type": "join", "userId": second.0, "userName": second.1}),
    )
    .await;

    let paired1 = next_json(&mut ws1).await;
    let paired2 = next_json(&mut ws2).await;
    assert_eq!(paired1["type"], "paired");
    assert_eq!(paired2["type"], "paired");
    assert_eq!(paired1["roomId"], paired2["roomId"]);
    assert_eq!(paired1["partnerName"], second.1);
    assert_eq!(paired2["partnerName"], first.1);

    expect_closed(&mut ws1).await;
    expect_closed(&mut ws2).await;

    paired1["roomId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが ok を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let body: Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_pair_then_chat_then_reconnect() {
    // テスト項目: u1 と u2 がペアリングされ、😀 が両者に届き、再接続後の history にも残る
    // given (前提条件):
    let server = TestServer::start().await;
    let room_id = pair(&server, ("u1", "Alice"), ("u2", "Bob")).await;
    let mut room1 = server.connect_room(&room_id, "u1", "Alice").await;
    let mut room2 = server.connect_room(&room_id, "u2", "Bob").await;
    let history1 = next_json(&mut room1).await;
    let history2 = next_json(&mut room2).await;
    assert_eq!(history1["type"], "history");
    assert_eq!(history1["messages"], json!([]));
    assert_eq!(history2["messages"], json!([]));

    // when (操作):
    send_json(&mut room1, json!({"type": "message", "message": "😀"})).await;

    // then (期待する結果):
    for ws in [&mut room1, &mut room2] {
        let received = next_json(ws).await;
        assert_eq!(received["type"], "message");
        assert_eq!(received["message"]["content"], "😀");
        assert_eq!(received["message"]["senderId"], "u1");
        assert_eq!(received["message"]["senderName"], "Alice");
        assert_eq!(received["message"]["roomId"], room_id.as_str());
    }

    // when (操作): u2 が一時的に切断して再接続する
    room2.close(None).await.unwrap();
    drop(room2);
    let mut room2 = server.connect_room(&room_id, "u2", "Bob").await;

    // then (期待する結果):
    let history = next_json(&mut room2).await;
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["senderId"], "u1");
    assert_eq!(messages[0]["content"], "😀");
}

#[tokio::test]
async fn test_messages_are_delivered_in_order() {
    // テスト項目: 連続して送ったメッセージが送信順に両者へ届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut room1 = server.connect_room("order-test", "u1", "Alice").await;
    let mut room2 = server.connect_room("order-test", "u2", "Bob").await;
    let _ = next_json(&mut room1).await;
    let _ = next_json(&mut room2).await;

    // when (操作):
    for text in ["one", "two", "three"] {
        send_json(&mut room1, json!({"type": "message", "message": text})).await;
    }

    // then (期待する結果):
    for ws in [&mut room1, &mut room2] {
        for expected in ["one", "two", "three"] {
            let received = next_json(ws).await;
            assert_eq!(received["message"]["content"], expected);
        }
    }
}

#[tokio::test]
async fn test_identity_in_message_frame() {
    // テスト項目: クエリなしで接続しても、メッセージに含めた identity で送信できる
    // given (前提条件):
    let server = TestServer::start().await;
    let (mut ws, _) = connect_async(server.ws_url("/api/chat/room/anon/websocket"))
        .await
        .unwrap();
    let _ = next_json(&mut ws).await;

    // when (操作):
    send_json(
        &mut ws,
        json!({"type": "message", "userId": "u9", "userName": "Zoe", "message": "hi"}),
    )
    .await;

    // then (期待する結果):
    let received = next_json(&mut ws).await;
    assert_eq!(received["message"]["senderId"], "u9");
    assert_eq!(received["message"]["senderName"], "Zoe");
}

#[tokio::test]
async fn test_invalid_room_id_is_rejected() {
    // テスト項目: 不正な Room ID での接続は拒否される
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let result = connect_async(server.ws_url("/api/chat/room/bad.room/websocket")).await;

    // then (期待する結果):
    assert!(result.is_err());
}

#[tokio::test]
async fn test_waiting_status_and_recent_pairs() {
    // テスト項目: 待合室の状態と直近のペアリングが HTTP で取得できる
    // given (前提条件):
    let server = TestServer::start().await;
    let room_id = pair(&server, ("u1", "Alice"), ("u2", "Bob")).await;
    let mut waiting = server.connect_waiting_room().await;
    send_json(
        &mut waiting,
        json!({"type": "join", "userId": "u3", "userName": "Carol"}),
    )
    .await;
    let _ = next_json(&mut waiting).await;

    // when (操作):
    // Closed waiting connections are released asynchronously.
    let mut status = Value::Null;
    for _ in 0..50 {
        status = reqwest::get(server.http_url("/api/waiting-room/status"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if status["waitingConnections"] == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let recent: Value = reqwest::get(server.http_url("/api/waiting-room/recent-pairs?limit=5"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(status["waitingCount"], 1);
    assert_eq!(status["waitingConnections"], 1);
    assert_eq!(status["roomConnections"], 0);
    let pairs = recent["pairs"].as_array().unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["roomId"], room_id.as_str());
    assert_eq!(pairs[0]["user1"], json!({"id": "u1", "name": "Alice"}));
    assert_eq!(pairs[0]["user2"], json!({"id": "u2", "name": "Bob"}));
}

#[tokio::test]
async fn test_heartbeats_keep_waiting_client_queued() {
    // テスト項目: テキストを送らなくても Ping を送り続ける待機中のクライアントは期限切れにならない
    // given (前提条件):
    let server = TestServer::start_with(ServerConfig {
        coordinator: CoordinatorConfig {
            idle_timeout: Duration::from_millis(300),
            sweep_interval: Duration::from_millis(50),
        },
        ..ServerConfig::default()
    })
    .await;
    let mut ws = server.connect_waiting_room().await;
    send_json(
        &mut ws,
        json!({"type": "join", "userId": "u1", "userName": "Alice"}),
    )
    .await;
    let waiting = next_json(&mut ws).await;
    assert_eq!(waiting["position"], 1);

    // when (操作):
    for _ in 0..8 {
        ws.send(Message::Ping(Default::default())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // then (期待する結果):
    let status: Value = reqwest::get(server.http_url("/api/waiting-room/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["waitingCount"], 1);
}

#[tokio::test]
async fn test_debug_rooms_lists_live_rooms() {
    // テスト項目: /debug/rooms が接続中の Room をメンバー数付きで返す
    // given (前提条件):
    let server = TestServer::start().await;
    let mut room = server.connect_room("debug-room", "u1", "Alice").await;
    let _ = next_json(&mut room).await;

    // when (操作):
    let body: Value = reqwest::get(server.http_url("/debug/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(
        body,
        json!({"rooms": [{"roomId": "debug-room", "memberCount": 1, "historyLength": 0}]})
    );
}

#[tokio::test]
async fn test_submit_and_list_messages() {
    // テスト項目: HTTP で保存したメッセージが履歴 API とルーム一覧から読める
    // given (前提条件):
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // when (操作):
    let response = client
        .post(server.http_url("/api/chat/room/R1/message"))
        .json(&json!({"userId": "u1", "userName": "Alice", "content": "hello"}))
        .send()
        .await
        .unwrap();
    let invalid = client
        .post(server.http_url("/api/chat/room/R1/message"))
        .json(&json!({"userId": "u1", "userName": "Alice", "content": ""}))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), json!({"success": true}));
    assert_eq!(invalid.status(), reqwest::StatusCode::BAD_REQUEST);

    let messages: Value = reqwest::get(server.http_url("/api/chat/room/R1/messages"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let messages = messages["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["userId"], "u1");
    assert_eq!(messages[0]["userName"], "Alice");
    assert_eq!(messages[0]["content"], "hello");

    let rooms: Value = reqwest::get(server.http_url("/api/chat/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(rooms, json!({"rooms": ["R1"]}));
}

//! End-to-end tests: a real server on a random port, real WebSocket
//! clients speaking the JSON protocol.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use ludo::prelude::*;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a seeded server on a random port and returns the address.
async fn start_server() -> String {
    let server = LudoServer::builder()
        .bind("127.0.0.1:0")
        .seed(42)
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send");
}

/// Next server message, failing the test after two seconds of silence.
async fn recv(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("json");
            }
            Message::Binary(_) => panic!("server frames should be text"),
            _ => continue,
        }
    }
}

/// Asserts nothing arrives for a short while.
async fn assert_silent(ws: &mut ClientWs) {
    let next = tokio::time::timeout(Duration::from_millis(150), ws.next()).await;
    assert!(next.is_err(), "expected no message, got {next:?}");
}

async fn expect_error(ws: &mut ClientWs, message: &str) {
    let msg = recv(ws).await;
    assert_eq!(msg, json!({"type": "error", "message": message}));
}

/// Host creates a two-player room and a guest joins it.
/// Returns (host, guest, code) with both inboxes drained.
async fn seated_pair(addr: &str) -> (ClientWs, ClientWs, String) {
    let mut host = connect(addr).await;
    let mut guest = connect(addr).await;

    send(&mut host, json!({"type": "create", "playerName": "Ann", "gameMode": "2-player"})).await;
    let created = recv(&mut host).await;
    let code = created["room"]["code"].as_str().unwrap().to_string();

    send(&mut guest, json!({"type": "join", "roomCode": code, "playerName": "Bo"})).await;
    assert_eq!(recv(&mut guest).await["type"], "room_joined");
    assert_eq!(recv(&mut host).await["type"], "room_updated");

    (host, guest, code)
}

/// Both players pick a colour and ready up; every broadcast is drained.
async fn ready_up(host: &mut ClientWs, guest: &mut ClientWs) {
    send(host, json!({"type": "choose_color", "color": "red"})).await;
    recv(host).await;
    recv(guest).await;
    send(guest, json!({"type": "choose_color", "color": "yellow"})).await;
    recv(host).await;
    recv(guest).await;
    send(host, json!({"type": "ready"})).await;
    recv(host).await;
    recv(guest).await;
    send(guest, json!({"type": "ready"})).await;
    recv(host).await;
    recv(guest).await;
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_create_returns_room_created() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, json!({"type": "create", "playerName": "Ann", "gameMode": "4-player"})).await;
    let msg = recv(&mut ws).await;

    assert_eq!(msg["type"], "room_created");
    let player_id = msg["playerId"].as_str().unwrap();
    assert_eq!(player_id.len(), 20);
    let room = &msg["room"];
    assert_eq!(room["code"].as_str().unwrap().len(), 6);
    assert_eq!(room["gameMode"], "4-player");
    assert_eq!(room["players"][0]["id"], player_id);
    assert_eq!(room["players"][0]["name"], "Ann");
    assert_eq!(room["gameState"]["gameStarted"], false);
}

#[tokio::test]
async fn test_full_lobby_to_game_start() {
    let addr = start_server().await;
    let (mut host, mut guest, _code) = seated_pair(&addr).await;

    send(&mut host, json!({"type": "choose_color", "color": "red"})).await;
    for ws in [&mut host, &mut guest] {
        let msg = recv(ws).await;
        assert_eq!(msg["type"], "room_updated");
        assert_eq!(msg["room"]["players"][0]["color"], "red");
    }

    send(&mut guest, json!({"type": "choose_color", "color": "yellow"})).await;
    recv(&mut host).await;
    recv(&mut guest).await;
    send(&mut host, json!({"type": "ready"})).await;
    recv(&mut host).await;
    recv(&mut guest).await;
    send(&mut guest, json!({"type": "ready"})).await;
    for ws in [&mut host, &mut guest] {
        let msg = recv(ws).await;
        assert_eq!(msg["room"]["players"][1]["isReady"], true);
    }

    send(&mut host, json!({"type": "start_game"})).await;
    for ws in [&mut host, &mut guest] {
        let msg = recv(ws).await;
        assert_eq!(msg["type"], "game_started");
        let state = &msg["room"]["gameState"];
        assert_eq!(state["gameStarted"], true);
        assert_eq!(state["currentTurnIndex"], 0);
        let pieces = state["pieces"].as_array().unwrap();
        assert_eq!(pieces.len(), 8);
        assert!(pieces.iter().all(|p| p["position"] == -1));
    }
}

#[tokio::test]
async fn test_malformed_message_invalid_format() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("{not json".into())).await.unwrap();
    expect_error(&mut ws, "Invalid message format").await;

    send(&mut ws, json!({"type": "teleport"})).await;
    expect_error(&mut ws, "Invalid message format").await;

    send(&mut ws, json!({"type": "create", "playerName": "Ann", "gameMode": "3-player"})).await;
    expect_error(&mut ws, "Invalid message format").await;

    // The connection is still usable.
    send(&mut ws, json!({"type": "create", "playerName": "Ann", "gameMode": "2-player"})).await;
    assert_eq!(recv(&mut ws).await["type"], "room_created");
}

#[tokio::test]
async fn test_binary_frames_are_accepted() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    let body = json!({"type": "create", "playerName": "Ann", "gameMode": "2-player"});
    ws.send(Message::Binary(body.to_string().into_bytes().into()))
        .await
        .unwrap();
    assert_eq!(recv(&mut ws).await["type"], "room_created");
}

#[tokio::test]
async fn test_join_unknown_room_not_found() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, json!({"type": "join", "roomCode": "NOPE99", "playerName": "Bo"})).await;
    expect_error(&mut ws, "Room not found").await;
}

#[tokio::test]
async fn test_join_lowercase_code_and_full_room() {
    let addr = start_server().await;
    let (_host, _guest, code) = seated_pair(&addr).await;

    let mut third = connect(&addr).await;
    send(
        &mut third,
        json!({"type": "join", "roomCode": code.to_lowercase(), "playerName": "Cy"}),
    )
    .await;
    expect_error(&mut third, "Room is full").await;
}

#[tokio::test]
async fn test_action_without_room_not_in_room() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, json!({"type": "roll_dice"})).await;
    expect_error(&mut ws, "Not in a room").await;
}

#[tokio::test]
async fn test_create_twice_already_in_room() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    send(&mut ws, json!({"type": "create", "playerName": "Ann", "gameMode": "2-player"})).await;
    recv(&mut ws).await;
    send(&mut ws, json!({"type": "create", "playerName": "Ann", "gameMode": "2-player"})).await;
    expect_error(&mut ws, "Already in a room").await;
}

#[tokio::test]
async fn test_color_taken_error_goes_to_sender_only() {
    let addr = start_server().await;
    let (mut host, mut guest, _code) = seated_pair(&addr).await;

    send(&mut host, json!({"type": "choose_color", "color": "red"})).await;
    recv(&mut host).await;
    recv(&mut guest).await;

    send(&mut guest, json!({"type": "choose_color", "color": "red"})).await;
    expect_error(&mut guest, "Color already taken").await;
    assert_silent(&mut host).await;
}

#[tokio::test]
async fn test_start_without_ready_rejected() {
    let addr = start_server().await;
    let (mut host, _guest, _code) = seated_pair(&addr).await;

    send(&mut host, json!({"type": "start_game"})).await;
    expect_error(&mut host, "Not all players are ready").await;
}

#[tokio::test]
async fn test_roll_out_of_turn_rejected() {
    let addr = start_server().await;
    let (mut host, mut guest, _code) = seated_pair(&addr).await;
    ready_up(&mut host, &mut guest).await;
    send(&mut host, json!({"type": "start_game"})).await;
    recv(&mut host).await;
    recv(&mut guest).await;

    send(&mut guest, json!({"type": "roll_dice"})).await;
    expect_error(&mut guest, "Not your turn").await;
    assert_silent(&mut host).await;

    send(&mut guest, json!({"type": "move_piece", "pieceId": "yellow-0"})).await;
    expect_error(&mut guest, "Not your turn").await;
}

#[tokio::test]
async fn test_roll_broadcasts_room_updated() {
    let addr = start_server().await;
    let (mut host, mut guest, _code) = seated_pair(&addr).await;
    ready_up(&mut host, &mut guest).await;
    send(&mut host, json!({"type": "start_game"})).await;
    recv(&mut host).await;
    recv(&mut guest).await;

    send(&mut host, json!({"type": "roll_dice"})).await;
    let host_view = recv(&mut host).await;
    let guest_view = recv(&mut guest).await;
    assert_eq!(host_view["type"], "room_updated");
    assert_eq!(host_view["room"], guest_view["room"]);

    let state = &host_view["room"]["gameState"];
    assert_eq!(state["isFirstRollThisTurn"], state["currentTurnIndex"] == 1);
    if state["movePending"] == true {
        // Only a six can free a piece from base.
        assert_eq!(state["currentRoll"], 6);
    } else {
        assert!(state["currentRoll"].is_null());
        assert!(state["lastRollOfPreviousPlayer"].is_u64());
    }
}

#[tokio::test]
async fn test_leave_notifies_remaining_player() {
    let addr = start_server().await;
    let (mut host, mut guest, _code) = seated_pair(&addr).await;

    send(&mut guest, json!({"type": "leave"})).await;
    let msg = recv(&mut host).await;
    assert_eq!(msg["type"], "room_updated");
    assert_eq!(msg["room"]["players"].as_array().unwrap().len(), 1);
    assert_silent(&mut guest).await;

    // The seat is free again, so the leaver may open a new room.
    send(&mut guest, json!({"type": "create", "playerName": "Bo", "gameMode": "4-player"})).await;
    assert_eq!(recv(&mut guest).await["type"], "room_created");
}

#[tokio::test]
async fn test_disconnect_is_implicit_leave() {
    let addr = start_server().await;
    let (mut host, guest, _code) = seated_pair(&addr).await;

    drop(guest);

    let msg = recv(&mut host).await;
    assert_eq!(msg["type"], "room_updated");
    let players = msg["room"]["players"].as_array().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["name"], "Ann");
}

#[tokio::test]
async fn test_last_player_leaving_destroys_room() {
    let addr = start_server().await;
    let mut host = connect(&addr).await;

    send(&mut host, json!({"type": "create", "playerName": "Ann", "gameMode": "2-player"})).await;
    let code = recv(&mut host).await["room"]["code"].as_str().unwrap().to_string();
    send(&mut host, json!({"type": "leave"})).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut late = connect(&addr).await;
    send(&mut late, json!({"type": "join", "roomCode": code, "playerName": "Bo"})).await;
    expect_error(&mut late, "Room not found").await;
}

#[tokio::test]
async fn test_multiple_rooms_independent() {
    let addr = start_server().await;
    let (mut a_host, mut a_guest, a_code) = seated_pair(&addr).await;
    let (mut b_host, _b_guest, b_code) = seated_pair(&addr).await;
    assert_ne!(a_code, b_code);

    send(&mut a_host, json!({"type": "choose_color", "color": "red"})).await;
    recv(&mut a_host).await;
    recv(&mut a_guest).await;
    assert_silent(&mut b_host).await;
}

//! Per-connection handler: identity, outbound writer, message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Issue a fresh `ParticipantId` for the connection
//!   2. Spawn a writer task that drains the participant's outbound channel
//!   3. Loop: receive frames → decode → dispatch to the registry or room
//!   4. On close, an implicit leave through the drop guard

use std::fmt::Display;
use std::sync::Arc;

use ludo_engine::ParticipantId;
use ludo_protocol::{ClientMessage, Codec, INVALID_MESSAGE_FORMAT, ServerMessage};
use ludo_room::{PlayerSender, RoomAction, RoomError};
use ludo_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::LudoError;
use crate::server::ServerState;

/// Drop guard that takes the participant out of their room when the
/// handler exits, however it exits.
///
/// `Drop` is synchronous, so the leave runs as a fire-and-forget task.
struct LeaveGuard {
    participant: ParticipantId,
    state: Arc<ServerState>,
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        let participant = self.participant.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Some(code) = state.rooms.leave_room(&participant).await {
                tracing::info!(
                    %participant,
                    room = %code,
                    "disconnected participant removed from room"
                );
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), LudoError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let participant = ParticipantId::random(&mut rand::rng());
    tracing::debug!(
        %conn_id,
        %participant,
        peer = %conn.peer_addr(),
        "participant connected"
    );

    // Rooms and this handler both push into `tx`; one writer keeps the
    // socket's frame order equal to the channel order.
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_outbound(Arc::clone(&conn), rx, state.codec));

    let _guard = LeaveGuard {
        participant: participant.clone(),
        state: Arc::clone(&state),
    };

    let result = read_loop(&conn, &state, &participant, &tx).await;

    writer.abort();
    tracing::debug!(%conn_id, %participant, "participant disconnected");
    result
}

async fn read_loop(
    conn: &WebSocketConnection,
    state: &ServerState,
    participant: &ParticipantId,
    tx: &PlayerSender,
) -> Result<(), LudoError> {
    loop {
        let data = match conn.recv().await? {
            Some(data) => data,
            None => return Ok(()),
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%participant, error = %e, "failed to decode message");
                send_error(tx, INVALID_MESSAGE_FORMAT);
                continue;
            }
        };

        if let Err(e) = dispatch(state, participant, msg, tx).await {
            send_error(tx, &e);
        }
    }
}

/// Routes one decoded message. Failures go back to the sender only.
async fn dispatch(
    state: &ServerState,
    participant: &ParticipantId,
    msg: ClientMessage,
    tx: &PlayerSender,
) -> Result<(), RoomError> {
    let action = match msg {
        ClientMessage::Create {
            player_name,
            game_mode,
        } => {
            state
                .rooms
                .create_room(participant.clone(), &player_name, game_mode, tx.clone())
                .await?;
            return Ok(());
        }
        ClientMessage::Join {
            room_code,
            player_name,
        } => {
            state
                .rooms
                .join_room(&room_code, participant.clone(), &player_name, tx.clone())
                .await?;
            return Ok(());
        }
        ClientMessage::Leave => {
            state.rooms.leave_room(participant).await;
            return Ok(());
        }
        ClientMessage::ChooseColor { color } => RoomAction::ChooseColor(color),
        ClientMessage::Ready => RoomAction::Ready,
        ClientMessage::StartGame => RoomAction::StartGame,
        ClientMessage::RollDice => RoomAction::RollDice,
        ClientMessage::MovePiece { piece_id } => RoomAction::MovePiece(piece_id),
    };

    let room = state.rooms.handle_for(participant).await?;
    room.act(participant.clone(), action).await
}

/// Encodes and writes everything queued for this participant.
async fn write_outbound(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    codec: impl Codec,
) {
    while let Some(msg) = rx.recv().await {
        let bytes = match codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode outbound message");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(conn_id = %conn.id(), error = %e, "send failed");
            break;
        }
    }
}

/// Queues an `error` message for this participant only.
fn send_error(tx: &PlayerSender, message: impl Display) {
    let _ = tx.send(ServerMessage::error(message));
}

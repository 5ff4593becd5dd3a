//! Room actor: an isolated Tokio task that owns one room.
//!
//! The outside world talks to it through a bounded mpsc channel. Every
//! command carries a oneshot reply, and the actor finishes the command,
//! broadcasts included, before it answers or looks at the next one.

use std::collections::HashMap;

use ludo_engine::{Color, ParticipantId, PieceId, Player, Room, RoomCode};
use ludo_protocol::ServerMessage;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};

use crate::RoomError;

/// Channel a room uses to push messages to one participant's
/// connection. Unbounded: a room never waits on a slow socket.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// An in-room operation requested by a seated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomAction {
    ChooseColor(Color),
    Ready,
    StartGame,
    RollDice,
    MovePiece(PieceId),
}

pub(crate) enum RoomCommand {
    Join {
        player: Player,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Replies with how many players remain.
    Leave {
        participant: ParticipantId,
        reply: oneshot::Sender<usize>,
    },

    Action {
        participant: ParticipantId,
        action: RoomAction,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Snapshot {
        reply: oneshot::Sender<Room>,
    },
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Runs `action` for `participant` and waits until the room has
    /// applied it and sent out the resulting broadcasts.
    pub async fn act(
        &self,
        participant: ParticipantId,
        action: RoomAction,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Action {
            participant,
            action,
            reply,
        })
        .await?
    }

    /// A copy of the room as it is right now.
    pub async fn snapshot(&self) -> Result<Room, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    pub(crate) async fn join(
        &self,
        player: Player,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join {
            player,
            sender,
            reply,
        })
        .await?
    }

    pub(crate) async fn leave(
        &self,
        participant: ParticipantId,
    ) -> Result<usize, RoomError> {
        self.request(|reply| RoomCommand::Leave { participant, reply })
            .await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

struct RoomActor {
    room: Room,
    rng: StdRng,
    senders: HashMap<ParticipantId, PlayerSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Processes commands until the last player leaves.
    async fn run(mut self) {
        let code = self.room.code().clone();
        tracing::debug!(room = %code, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { participant, reply } => {
                    self.handle_leave(&participant);
                    let remaining = self.room.players().len();
                    let _ = reply.send(remaining);
                    if remaining == 0 {
                        break;
                    }
                }
                RoomCommand::Action {
                    participant,
                    action,
                    reply,
                } => {
                    let result = self.handle_action(&participant, action);
                    if let Err(e) = &result {
                        tracing::debug!(
                            room = %code,
                            %participant,
                            error = %e,
                            "action rejected"
                        );
                    }
                    let _ = reply.send(result);
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.room.clone());
                }
            }
        }

        tracing::debug!(room = %code, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player: Player,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let participant = player.id().clone();
        self.room.add_player(player)?;
        self.senders.insert(participant.clone(), sender);

        tracing::info!(
            room = %self.room.code(),
            %participant,
            players = self.room.players().len(),
            "player joined"
        );

        self.send_to(
            &participant,
            ServerMessage::RoomJoined {
                room: self.room.clone(),
                player_id: participant.clone(),
            },
        );
        self.broadcast_except(
            &participant,
            ServerMessage::RoomUpdated {
                room: self.room.clone(),
            },
        );
        Ok(())
    }

    fn handle_leave(&mut self, participant: &ParticipantId) {
        if self.room.remove_player(participant).is_none() {
            return;
        }
        self.senders.remove(participant);

        tracing::info!(
            room = %self.room.code(),
            %participant,
            players = self.room.players().len(),
            "player left"
        );

        if !self.room.is_empty() {
            self.broadcast_update();
        }
    }

    fn handle_action(
        &mut self,
        participant: &ParticipantId,
        action: RoomAction,
    ) -> Result<(), RoomError> {
        if !self.room.contains(participant) {
            return Err(RoomError::NotInRoom);
        }

        match action {
            RoomAction::ChooseColor(color) => {
                self.room.choose_color(participant, color)?;
                self.broadcast_update();
            }
            RoomAction::Ready => {
                if self.room.game_state().game_started() {
                    return Ok(());
                }
                self.room.set_ready(participant)?;
                self.broadcast_update();
            }
            RoomAction::StartGame => {
                self.room.start_game()?;
                self.broadcast(ServerMessage::GameStarted {
                    room: self.room.clone(),
                });
            }
            RoomAction::RollDice => {
                self.room.roll(participant, &mut self.rng)?;
                self.broadcast_update();
            }
            RoomAction::MovePiece(piece_id) => {
                let outcome = self.room.move_piece(participant, &piece_id)?;
                self.broadcast_update();
                if let Some(captured_piece) = outcome.captured {
                    self.broadcast(ServerMessage::PieceCaptured {
                        captured_piece,
                        room: self.room.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn broadcast_update(&self) {
        self.broadcast(ServerMessage::RoomUpdated {
            room: self.room.clone(),
        });
    }

    fn broadcast(&self, msg: ServerMessage) {
        for sender in self.senders.values() {
            let _ = sender.send(msg.clone());
        }
    }

    fn broadcast_except(&self, excluded: &ParticipantId, msg: ServerMessage) {
        for (participant, sender) in &self.senders {
            if participant != excluded {
                let _ = sender.send(msg.clone());
            }
        }
    }

    /// Silently drops the message if the participant's connection is gone.
    fn send_to(&self, participant: &ParticipantId, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(participant) {
            let _ = sender.send(msg);
        }
    }
}

/// Spawns the actor for a freshly created room and returns its handle.
///
/// The host is told about the room before the actor starts, so
/// `room_created` always precedes anything else the room sends them.
pub(crate) fn spawn_room(
    room: Room,
    host_sender: PlayerSender,
    rng: StdRng,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let code = room.code().clone();

    let mut senders = HashMap::new();
    if let Some(host) = room.host() {
        let _ = host_sender.send(ServerMessage::RoomCreated {
            room: room.clone(),
            player_id: host.id().clone(),
        });
        senders.insert(host.id().clone(), host_sender);
    }

    let actor = RoomActor {
        room,
        rng,
        senders,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}

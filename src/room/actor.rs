//! One task per room. The task owns the [`GameRoom`]; everything else talks to
//! it through [`RoomHandle`], so intents and timer callbacks for a room are
//! applied strictly one at a time.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use crate::config::RoomOptions;
use crate::game::GameState;

use super::clock::{Clock, TimerEvent, TimerKind};
use super::core::GameRoom;
use super::intent::Intent;
use super::manager::RoomError;

#[derive(Debug)]
pub enum RoomCommand {
    Join {
        session_id: String,
        name: String,
        reply: oneshot::Sender<Result<u8, RoomError>>,
    },
    /// Transport went away. Same rules as a `leaveRoom` intent.
    Leave { session_id: String },
    Intent { session_id: String, intent: Intent },
    TimerFired(TimerEvent),
    Snapshot { reply: oneshot::Sender<GameState> },
    Shutdown,
}

#[derive(Clone, Debug)]
pub struct RoomHandle {
    room_id: String,
    tx: mpsc::UnboundedSender<RoomCommand>,
    state: watch::Receiver<Arc<GameState>>,
}

impl RoomHandle {
    pub fn spawn(room_id: impl Into<String>, options: RoomOptions) -> Self {
        Self::spawn_room(GameRoom::new(room_id, options))
    }

    pub fn spawn_room(room: GameRoom) -> Self {
        let room_id = room.room_id().to_string();
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(Arc::new(room.state().clone()));
        let clock = Clock::new(tx.downgrade());
        tokio::spawn(run(room, rx, clock, state_tx));
        RoomHandle { room_id, tx, state }
    }

    pub fn room_id(&self) -> &str { &self.room_id }

    pub async fn join(&self, session_id: &str, name: &str) -> Result<u8, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RoomCommand::Join { session_id: session_id.to_string(), name: name.to_string(), reply })
            .map_err(|_| RoomError::Closed)?;
        rx.await.map_err(|_| RoomError::Closed)?
    }

    pub fn leave(&self, session_id: &str) {
        let _ = self.tx.send(RoomCommand::Leave { session_id: session_id.to_string() });
    }

    pub fn send(&self, session_id: &str, intent: Intent) -> Result<(), RoomError> {
        self.tx
            .send(RoomCommand::Intent { session_id: session_id.to_string(), intent })
            .map_err(|_| RoomError::Closed)
    }

    /// Current state, after everything queued before this call has been applied.
    pub async fn snapshot(&self) -> Result<GameState, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(RoomCommand::Snapshot { reply }).map_err(|_| RoomError::Closed)?;
        rx.await.map_err(|_| RoomError::Closed)
    }

    /// Receives a new state every time the room changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<GameState>> { self.state.clone() }

    pub fn shutdown(&self) { let _ = self.tx.send(RoomCommand::Shutdown); }

    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}

async fn run(
    mut room: GameRoom,
    mut rx: mpsc::UnboundedReceiver<RoomCommand>,
    mut clock: Clock,
    state_tx: watch::Sender<Arc<GameState>>,
) {
    info!(room_id = %room.room_id(), "room opened");
    room.schedule_empty_check();
    for scheduled in room.take_scheduled() {
        clock.schedule(scheduled);
    }
    while let Some(command) = rx.recv().await {
        let mut closing = false;
        match command {
            RoomCommand::Join { session_id, name, reply } => {
                let _ = reply.send(room.join(&session_id, &name));
            }
            RoomCommand::Leave { session_id } => {
                room.leave(&session_id);
                closing = room.connected_players() == 0;
            }
            RoomCommand::Intent { session_id, intent } => {
                let leaving = matches!(intent, Intent::LeaveRoom);
                // rejections are already logged by the room
                let _ = room.dispatch(&session_id, intent);
                closing = leaving && room.connected_players() == 0;
            }
            RoomCommand::TimerFired(TimerEvent { kind: TimerKind::EmptyRoomCheck, .. }) => {
                closing = room.connected_players() == 0;
                if closing {
                    info!(room_id = %room.room_id(), "room empty since opening");
                }
            }
            RoomCommand::TimerFired(event) => room.on_timer(event),
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(room.state().clone());
            }
            RoomCommand::Shutdown => closing = true,
        }

        for scheduled in room.take_scheduled() {
            clock.schedule(scheduled);
        }
        state_tx.send_if_modified(|current| {
            if **current == *room.state() {
                return false;
            }
            *current = Arc::new(room.state().clone());
            true
        });

        if closing {
            break;
        }
    }

    debug!(room_id = %room.room_id(), pending_timers = clock.pending(), "cancelling timers");
    clock.cancel_all();
    info!(room_id = %room.room_id(), "room closed");
}

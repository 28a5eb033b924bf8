//! Room-local cancelable clock. Timers never touch room state directly: when
//! one fires it posts a [`TimerEvent`] into the room's own queue, so timer
//! callbacks and client intents are processed strictly one after another.

use std::time::Duration;

use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::AbortHandle;

use super::actor::RoomCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    DealRound,
    StartCountdown,
    CountdownTick,
    BeginPlay,
    DobonReturnExpired,
    ReturnToWaiting,
    /// Closes the room if nobody is connected when it fires.
    EmptyRoomCheck,
}

/// A timer firing, stamped with the game epoch that scheduled it. Events from
/// an older epoch are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub epoch: u64,
    pub kind: TimerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub after: Duration,
    pub event: TimerEvent,
}

pub struct Clock {
    tx: WeakUnboundedSender<RoomCommand>,
    pending: Vec<AbortHandle>,
}

impl Clock {
    pub fn new(tx: WeakUnboundedSender<RoomCommand>) -> Self {
        Self { tx, pending: Vec::new() }
    }

    pub fn schedule(&mut self, scheduled: Scheduled) {
        self.pending.retain(|h| !h.is_finished());
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(scheduled.after).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(RoomCommand::TimerFired(scheduled.event));
            }
        });
        self.pending.push(handle.abort_handle());
    }

    /// Number of timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn cancel_all(&mut self) {
        for handle in self.pending.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for Clock {
    fn drop(&mut self) { self.cancel_all(); }
}

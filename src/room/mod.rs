//! Rooms: the per-room state machine, its actor task and the registry.

pub mod actor;
pub mod clock;
pub mod commands;
pub mod core;
pub mod intent;
pub mod manager;

#[cfg(test)]
pub(crate) mod testing;

pub use actor::{RoomCommand, RoomHandle};
pub use self::core::GameRoom;
pub use intent::Intent;
pub use manager::{CreatedRoom, RoomError, RoomManager};

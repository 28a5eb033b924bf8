//! Registry of rooms and task orchestration.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::RoomOptions;
use crate::util::id::new_room_id;

use super::actor::RoomHandle;

#[derive(Clone, Default)]
pub struct RoomManager {
    rooms: Arc<DashMap<String, RoomHandle>>,
    options: RoomOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRoom {
    pub room_id: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room not found")]
    NotFound,
    #[error("room full")]
    Full,
    #[error("game already in progress")]
    GameInProgress,
    #[error("session already connected")]
    SessionInUse,
    #[error("room closed")]
    Closed,
}

impl RoomManager {
    pub fn new(options: RoomOptions) -> Self { Self { rooms: Arc::new(DashMap::new()), options } }

    /// Spawns a fresh room task. Must be called inside a tokio runtime.
    pub fn create_room(&self) -> CreatedRoom {
        self.prune_closed();
        let room_id = self.spawn_with(new_room_id);
        info!(%room_id, rooms = self.rooms.len(), "room created");
        CreatedRoom { room_id }
    }

    /// Draws ids from `next_id` until one is free, then spawns the room there.
    fn spawn_with(&self, mut next_id: impl FnMut() -> String) -> String {
        loop {
            let room_id = next_id();
            match self.rooms.entry(room_id.clone()) {
                Entry::Occupied(_) => debug!(%room_id, "room id taken, drawing another"),
                Entry::Vacant(slot) => {
                    slot.insert(RoomHandle::spawn(room_id.clone(), self.options.clone()));
                    return room_id;
                }
            }
        }
    }

    pub fn get(&self, room_id: &str) -> Result<RoomHandle, RoomError> {
        let handle = self.rooms.get(room_id).map(|h| h.clone()).ok_or(RoomError::NotFound)?;
        if handle.is_closed() {
            self.rooms.remove(room_id);
            return Err(RoomError::NotFound);
        }
        Ok(handle)
    }

    pub fn close_room(&self, room_id: &str) -> Result<(), RoomError> {
        let (_, handle) = self.rooms.remove(room_id).ok_or(RoomError::NotFound)?;
        handle.shutdown();
        Ok(())
    }

    /// Forgets rooms whose task has exited.
    pub fn prune_closed(&self) { self.rooms.retain(|_, handle| !handle.is_closed()); }

    pub fn len(&self) -> usize { self.rooms.len() }

    pub fn is_empty(&self) -> bool { self.rooms.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_get_close() {
        let manager = RoomManager::default();
        let CreatedRoom { room_id } = manager.create_room();
        assert_eq!(room_id.len(), 10);
        assert_eq!(manager.len(), 1);

        let handle = manager.get(&room_id).unwrap();
        assert_eq!(handle.room_id(), room_id);
        assert_eq!(handle.join("s1", "Alice").await, Ok(1));

        manager.close_room(&room_id).unwrap();
        assert_eq!(manager.get(&room_id).err(), Some(RoomError::NotFound));
        assert_eq!(manager.close_room(&room_id), Err(RoomError::NotFound));
    }

    #[tokio::test]
    async fn closed_rooms_are_pruned() {
        let manager = RoomManager::default();
        let CreatedRoom { room_id } = manager.create_room();
        let handle = manager.get(&room_id).unwrap();
        handle.join("s1", "Alice").await.unwrap();
        handle.leave("s1");
        // the room only closes once the leave is processed
        assert!(handle.snapshot().await.is_err());

        manager.prune_closed();
        assert!(manager.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rooms_nobody_joins_are_pruned() {
        let manager = RoomManager::default();
        for _ in 0..5 {
            manager.create_room();
        }
        let CreatedRoom { room_id: kept } = manager.create_room();
        manager.get(&kept).unwrap().join("s1", "Alice").await.unwrap();
        assert_eq!(manager.len(), 6);

        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        manager.prune_closed();
        assert_eq!(manager.len(), 1);
        assert!(manager.get(&kept).is_ok());
    }

    #[tokio::test]
    async fn taken_ids_are_not_reused() {
        let manager = RoomManager::default();
        let mut ids = ["AAAA", "AAAA", "BBBB"].into_iter().map(String::from);
        assert_eq!(manager.spawn_with(|| ids.next().unwrap()), "AAAA");
        let first = manager.get("AAAA").unwrap();
        first.join("s1", "Alice").await.unwrap();

        assert_eq!(manager.spawn_with(|| ids.next().unwrap()), "BBBB");
        assert_eq!(manager.len(), 2);
        // the first room is still the one registered under its id
        assert_eq!(manager.get("AAAA").unwrap().snapshot().await.unwrap().players.len(), 1);
    }
}

use crate::registry::ConnectionRegistry;
use crate::room::{Room, RoomHandle, RoomInfo, RoomSettings, RoomState};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use huddle_core::RoomId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

pub(crate) type RoomTable = DashMap<RoomId, RoomHandle>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("room `{0}` already exists")]
    AlreadyExists(RoomId),
}

/// Maps room ids to running room actors. Lookups and inserts lock one shard
/// of the table; the rooms themselves never share a lock.
#[derive(Clone)]
pub struct RoomDirectory {
    rooms: Arc<RoomTable>,
    registry: ConnectionRegistry,
    settings: RoomSettings,
    next_generation: Arc<AtomicU64>,
}

impl RoomDirectory {
    pub fn new(registry: ConnectionRegistry, settings: RoomSettings) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            registry,
            settings,
            next_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the existing room, or starts one. `secret` is only stored when
    /// the room is new.
    pub fn create_or_get(&self, room_id: &RoomId, secret: Option<String>) -> RoomHandle {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(slot) => slot.get().clone(),
            Entry::Vacant(slot) => {
                let handle = self.spawn_room(RoomState::new(room_id.clone(), secret, false));
                slot.insert(handle.clone());
                handle
            }
        }
    }

    /// Explicit creation. The room survives until its first member has come
    /// and gone.
    pub fn create(&self, room_id: &RoomId, secret: Option<String>) -> Result<RoomHandle, RoomError> {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(_) => Err(RoomError::AlreadyExists(room_id.clone())),
            Entry::Vacant(slot) => {
                let handle = self.spawn_room(RoomState::new(room_id.clone(), secret, true));
                slot.insert(handle.clone());
                Ok(handle)
            }
        }
    }

    pub fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).map(|handle| handle.clone())
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// No-op when the room does not exist.
    pub async fn set_locked(&self, room_id: &RoomId, locked: bool) {
        if let Some(handle) = self.get(room_id) {
            handle.set_locked(locked).await;
        }
    }

    /// Releases all members (they receive `room-closed`) and drops the room.
    /// Safe to call on an absent room.
    pub async fn delete(&self, room_id: &RoomId) {
        if let Some(handle) = self.get(room_id) {
            handle.close().await;
        }
    }

    pub async fn info(&self, room_id: &RoomId) -> Option<RoomInfo> {
        self.get(room_id)?.info().await
    }

    pub async fn list(&self) -> Vec<RoomInfo> {
        let handles: Vec<RoomHandle> = self.rooms.iter().map(|e| e.value().clone()).collect();

        let mut rooms = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Some(info) = handle.info().await {
                rooms.push(info);
            }
        }
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        rooms
    }

    fn spawn_room(&self, state: RoomState) -> RoomHandle {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.settings.queue_capacity);

        info!(room = %state.id(), generation, "Creating new room");
        let handle = RoomHandle::new(state.id().clone(), generation, tx);
        let room = Room::new(
            state,
            generation,
            rx,
            self.registry.clone(),
            Arc::downgrade(&self.rooms),
            self.settings,
        );
        tokio::spawn(room.run());

        handle
    }
}

use huddle_core::{ErrorCode, PeerId, RoomId, ServerMessage};
use serde::Serialize;

/// Read-only summary of a room, as exposed over HTTP.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub members: Vec<PeerId>,
    pub host: Option<PeerId>,
    pub locked: bool,
    pub has_secret: bool,
}

/// Result of removing a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    /// Set when the departing member was host and someone was promoted.
    pub new_host: Option<PeerId>,
}

/// Membership and policy of one room. Owned by the room's actor; nothing here
/// is shared.
#[derive(Debug)]
pub struct RoomState {
    id: RoomId,
    members: Vec<PeerId>,
    host: Option<PeerId>,
    locked: bool,
    secret: Option<String>,
    explicit: bool,
    ever_joined: bool,
}

impl RoomState {
    pub fn new(id: RoomId, secret: Option<String>, explicit: bool) -> Self {
        Self {
            id,
            members: Vec::new(),
            host: None,
            locked: false,
            secret: secret.filter(|s| !s.is_empty()),
            explicit,
            ever_joined: false,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn members(&self) -> &[PeerId] {
        &self.members
    }

    pub fn host(&self) -> Option<PeerId> {
        self.host
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_member(&self, peer_id: &PeerId) -> bool {
        self.members.contains(peer_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn others<'a>(&'a self, peer_id: &'a PeerId) -> impl Iterator<Item = &'a PeerId> + 'a {
        self.members.iter().filter(move |p| *p != peer_id)
    }

    pub fn check_secret(&self, supplied: Option<&str>) -> Result<(), ErrorCode> {
        match &self.secret {
            Some(secret) if supplied != Some(secret.as_str()) => Err(ErrorCode::WrongSecret),
            _ => Ok(()),
        }
    }

    /// Everything a non-member must pass before being admitted.
    pub fn check_admission(&self, supplied_secret: Option<&str>) -> Result<(), ErrorCode> {
        self.check_secret(supplied_secret)?;
        if self.locked {
            return Err(ErrorCode::RoomLocked);
        }
        Ok(())
    }

    /// Appends a member. The first member ever present in an empty room
    /// becomes host.
    pub fn push_member(&mut self, peer_id: PeerId) {
        if self.is_member(&peer_id) {
            return;
        }
        self.members.push(peer_id);
        self.ever_joined = true;
        if self.host.is_none() {
            self.host = Some(peer_id);
        }
    }

    pub fn remove_member(&mut self, peer_id: &PeerId) -> Option<Departure> {
        let idx = self.members.iter().position(|p| p == peer_id)?;
        self.members.remove(idx);

        let mut new_host = None;
        if self.host == Some(*peer_id) {
            self.host = self.members.first().copied();
            new_host = self.host;
        }
        Some(Departure { new_host })
    }

    pub fn authorize_host(&self, peer_id: &PeerId) -> Result<(), ErrorCode> {
        if !self.is_member(peer_id) {
            return Err(ErrorCode::NotInRoom);
        }
        if self.host != Some(*peer_id) {
            return Err(ErrorCode::NotAuthorized);
        }
        Ok(())
    }

    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        self.locked
    }

    /// Returns true if the flag actually changed.
    pub fn set_locked(&mut self, locked: bool) -> bool {
        let changed = self.locked != locked;
        self.locked = locked;
        changed
    }

    /// Empty rooms are dropped, except an explicitly created room that is
    /// still waiting for its first member.
    pub fn should_retire(&self) -> bool {
        self.members.is_empty() && (self.ever_joined || !self.explicit)
    }

    pub fn snapshot_for(&self, peer_id: &PeerId) -> ServerMessage {
        ServerMessage::MembershipSnapshot {
            room_id: self.id.clone(),
            peers: self.others(peer_id).copied().collect(),
            host: self.host.unwrap_or(*peer_id),
            locked: self.locked,
        }
    }

    pub fn lock_event(&self) -> ServerMessage {
        if self.locked {
            ServerMessage::Locked
        } else {
            ServerMessage::Unlocked
        }
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.id.clone(),
            members: self.members.clone(),
            host: self.host,
            locked: self.locked,
            has_secret: self.secret.is_some(),
        }
    }
}

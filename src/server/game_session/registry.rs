/// Room registry.
///
/// Owns every live `GameSession`, keyed by room id, plus the reverse index
/// from player to room used by disconnect cleanup. Room ids come from a
/// `RoomIdGenerator` and must never repeat within a registry.
use std::collections::HashMap;
use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::GameSession;
use super::timer::RoundScheduler;
use crate::server::matchmaking::types::PlayerId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl From<&str> for RoomId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for RoomId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of room ids. Implementations must never hand out the same id twice.
pub trait RoomIdGenerator {
    fn next_id(&mut self) -> RoomId;
}

/// `room-<uuid v4>`.
#[derive(Debug, Default)]
pub struct UuidRoomIds;

impl RoomIdGenerator for UuidRoomIds {
    fn next_id(&mut self) -> RoomId {
        RoomId(format!("room-{}", Uuid::new_v4()))
    }
}

/// `room-1`, `room-2`, ...
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequentialRoomIds {
    next: u64,
}

#[cfg(test)]
impl RoomIdGenerator for SequentialRoomIds {
    fn next_id(&mut self) -> RoomId {
        self.next += 1;
        RoomId(format!("room-{}", self.next))
    }
}

pub struct RoomRegistry<H> {
    sessions: HashMap<RoomId, GameSession<H>>,
    player_rooms: HashMap<PlayerId, RoomId>,
    ids: Box<dyn RoomIdGenerator>,
}

impl<H> RoomRegistry<H> {
    pub fn new(ids: Box<dyn RoomIdGenerator>) -> Self {
        Self {
            sessions: HashMap::new(),
            player_rooms: HashMap::new(),
            ids,
        }
    }

    /// Create a session for two distinct players and return its room id.
    ///
    /// Panics if the generator repeats an id or a player is already seated:
    /// both would break the one-owner-per-session invariant.
    pub fn create(&mut self, mode: &str, first: PlayerId, second: PlayerId) -> RoomId {
        assert_ne!(first, second, "a room needs two distinct players");
        for player in [first, second] {
            if let Some(room) = self.player_rooms.get(&player) {
                panic!("player {player} is already seated in {room}");
            }
        }
        let room_id = self.ids.next_id();
        if self.sessions.contains_key(&room_id) {
            panic!("room id collision: {room_id}");
        }
        self.sessions.insert(
            room_id.clone(),
            GameSession::new(room_id.clone(), mode, [first, second]),
        );
        self.player_rooms.insert(first, room_id.clone());
        self.player_rooms.insert(second, room_id.clone());
        info!(
            "[Registry] Room {} created for {} and {} (mode {:?})",
            room_id, first, second, mode
        );
        room_id
    }

    #[cfg(test)]
    pub fn get(&self, room_id: &RoomId) -> Option<&GameSession<H>> {
        self.sessions.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &RoomId) -> Option<&mut GameSession<H>> {
        self.sessions.get_mut(room_id)
    }

    pub fn room_of(&self, player: &PlayerId) -> Option<&RoomId> {
        self.player_rooms.get(player)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove the session, cancelling its pending round timer. No-op for unknown rooms.
    pub fn destroy<S>(&mut self, room_id: &RoomId, scheduler: &mut S) -> Option<GameSession<H>>
    where
        S: RoundScheduler<Handle = H>,
    {
        let mut session = self.sessions.remove(room_id)?;
        if let Some(handle) = session.take_timer() {
            scheduler.cancel(handle);
        }
        for player in session.players() {
            self.player_rooms.remove(player);
        }
        info!("[Registry] Room {} destroyed", room_id);
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::ManualScheduler;

    fn registry() -> RoomRegistry<u64> {
        RoomRegistry::new(Box::new(SequentialRoomIds::default()))
    }

    #[test]
    fn test_sequential_ids_are_distinct() {
        let mut ids = SequentialRoomIds::default();
        assert_eq!(ids.next_id(), RoomId::from("room-1"));
        assert_eq!(ids.next_id(), RoomId::from("room-2"));
    }

    #[test]
    fn test_uuid_ids_are_distinct() {
        let mut ids = UuidRoomIds;
        assert_ne!(ids.next_id(), ids.next_id());
    }

    #[test]
    fn test_create_and_lookup() {
        let mut registry = registry();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let room = registry.create("cities", a, b);
        let session = registry.get(&room).unwrap();
        assert_eq!(session.players(), &[a, b]);
        assert_eq!(session.mode(), "cities");
        assert_eq!(registry.room_of(&a), Some(&room));
        assert_eq!(registry.room_of(&b), Some(&room));
    }

    #[test]
    fn test_destroy_releases_everything() {
        let mut registry = registry();
        let mut scheduler = ManualScheduler::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let room = registry.create("cities", a, b);
        assert!(registry.destroy(&room, &mut scheduler).is_some());
        assert!(registry.get(&room).is_none());
        assert!(registry.room_of(&a).is_none());
        assert!(registry.is_empty());
        assert!(registry.destroy(&room, &mut scheduler).is_none());
    }

    #[test]
    fn test_unknown_room_is_not_found() {
        let registry = registry();
        assert!(registry.get(&RoomId::from("room-404")).is_none());
    }

    struct RepeatingIds;

    impl RoomIdGenerator for RepeatingIds {
        fn next_id(&mut self) -> RoomId {
            RoomId::from("room-same")
        }
    }

    #[test]
    #[should_panic(expected = "room id collision")]
    fn test_id_collision_is_fatal() {
        let mut registry: RoomRegistry<u64> = RoomRegistry::new(Box::new(RepeatingIds));
        registry.create("cities", Uuid::new_v4(), Uuid::new_v4());
        registry.create("cities", Uuid::new_v4(), Uuid::new_v4());
    }
}

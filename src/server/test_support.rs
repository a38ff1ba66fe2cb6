//! Fakes for driving the session core without actors or sockets.

use std::collections::HashMap;
use std::time::Duration;

use crate::server::game_session::registry::RoomId;
use crate::server::game_session::timer::RoundScheduler;
use crate::server::gateway::EventSink;
use crate::server::matchmaking::types::PlayerId;
use crate::server::messages::ServerWsMessage;

#[derive(Debug, Clone, PartialEq)]
pub struct PendingTimeout {
    pub handle: u64,
    pub room_id: RoomId,
    pub round: u32,
    pub after: Duration,
}

/// Records scheduled timeouts; tests fire them by hand.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: u64,
    pub pending: Vec<PendingTimeout>,
    pub cancelled: Vec<u64>,
}

impl ManualScheduler {
    /// Remove and return the oldest pending timeout, as if it had fired.
    pub fn fire_next(&mut self) -> Option<PendingTimeout> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl RoundScheduler for ManualScheduler {
    type Handle = u64;

    fn schedule_round_timeout(&mut self, room_id: &RoomId, round: u32, after: Duration) -> u64 {
        self.next += 1;
        self.pending.push(PendingTimeout {
            handle: self.next,
            room_id: room_id.clone(),
            round,
            after,
        });
        self.next
    }

    fn cancel(&mut self, handle: u64) {
        self.pending.retain(|t| t.handle != handle);
        self.cancelled.push(handle);
    }
}

/// Delivers every event into per-player inboxes, resolving room members at emit time.
#[derive(Debug, Default)]
pub struct RecordingSink {
    rooms: HashMap<RoomId, Vec<PlayerId>>,
    inboxes: HashMap<PlayerId, Vec<ServerWsMessage>>,
    pub closed_rooms: Vec<RoomId>,
}

impl RecordingSink {
    pub fn inbox(&self, player: &PlayerId) -> &[ServerWsMessage] {
        self.inboxes.get(player).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, player: &PlayerId, pred: impl Fn(&ServerWsMessage) -> bool) -> usize {
        self.inbox(player).iter().filter(|m| pred(m)).count()
    }

    pub fn members(&self, room: &RoomId) -> &[PlayerId] {
        self.rooms.get(room).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl EventSink for RecordingSink {
    fn emit_to(&mut self, player: PlayerId, event: ServerWsMessage) {
        self.inboxes.entry(player).or_default().push(event);
    }

    fn join_room(&mut self, room: &RoomId, player: PlayerId) {
        self.rooms.entry(room.clone()).or_default().push(player);
    }

    fn emit_to_room(&mut self, room: &RoomId, event: ServerWsMessage) {
        let members = self.rooms.get(room).cloned().unwrap_or_default();
        for player in members {
            self.emit_to(player, event.clone());
        }
    }

    fn close_room(&mut self, room: &RoomId) {
        self.rooms.remove(room);
        self.closed_rooms.push(room.clone());
    }
}

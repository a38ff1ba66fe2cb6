//! Cancelable deferred round timeouts.

use std::time::Duration;

use super::registry::RoomId;

/// Schedules the expiry of a round and cancels it again.
///
/// A fired timeout is delivered back to the session core as
/// `(room_id, round)`; the core ignores it if that round is no longer open.
pub trait RoundScheduler {
    type Handle;

    fn schedule_round_timeout(&mut self, room_id: &RoomId, round: u32, after: Duration) -> Self::Handle;

    fn cancel(&mut self, handle: Self::Handle);
}

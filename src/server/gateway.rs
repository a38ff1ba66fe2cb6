//! Outbound delivery seam between the session core and the transport.

use crate::server::game_session::registry::RoomId;
use crate::server::matchmaking::types::PlayerId;
use crate::server::messages::ServerWsMessage;

/// "Emit to one / emit to room" capability.
///
/// Room membership lives on the transport side; the core only tells it who
/// joins a room and when the room is gone. Delivery to a player that is no
/// longer connected is silently dropped.
pub trait EventSink {
    fn emit_to(&mut self, player: PlayerId, event: ServerWsMessage);

    fn join_room(&mut self, room: &RoomId, player: PlayerId);

    fn emit_to_room(&mut self, room: &RoomId, event: ServerWsMessage);

    fn close_room(&mut self, room: &RoomId);
}

/// Session core wiring.
///
/// Owns the match queue, the room registry, the shared rules and the random
/// source, and routes every inbound event (join, guess, timer expiry,
/// disconnect) to the right component. Events are handled one at a time and
/// each handler runs to completion; the actor in `game_server` is the only
/// caller in production.
use log::{debug, info};
use rand::rngs::StdRng;

use crate::game::types::Coordinates;
use crate::server::game_session::registry::{RoomId, RoomIdGenerator, RoomRegistry};
use crate::server::game_session::session::{GameSession, Progress, Rules, SessionContext};
use crate::server::game_session::timer::RoundScheduler;
use crate::server::gateway::EventSink;
use crate::server::matchmaking::queue::{EnqueueOutcome, MatchQueue};
use crate::server::matchmaking::types::PlayerId;
use crate::server::messages::{GameStartData, ServerWsMessage};

pub struct Coordinator<H> {
    queue: MatchQueue,
    registry: RoomRegistry<H>,
    rules: Rules,
    rng: StdRng,
}

impl<H> Coordinator<H> {
    pub fn new(rules: Rules, ids: Box<dyn RoomIdGenerator>, rng: StdRng) -> Self {
        Self {
            queue: MatchQueue::new(),
            registry: RoomRegistry::new(ids),
            rules,
            rng,
        }
    }

    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    pub fn registry(&self) -> &RoomRegistry<H> {
        &self.registry
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Queue `player` for `mode`; a completed pair gets a room and round 1.
    pub fn join<S>(&mut self, player: PlayerId, mode: &str, scheduler: &mut S, sink: &mut dyn EventSink)
    where
        S: RoundScheduler<Handle = H>,
    {
        if let Some(room_id) = self.registry.room_of(&player) {
            debug!("[Coordinator] Player {} is already in {}, join ignored", player, room_id);
            sink.emit_to(player, ServerWsMessage::status("Already in a game"));
            return;
        }
        let pairing = match self.queue.enqueue(player, mode) {
            EnqueueOutcome::AlreadyQueued => {
                sink.emit_to(player, ServerWsMessage::status("Already waiting for an opponent"));
                return;
            }
            EnqueueOutcome::Waiting => {
                sink.emit_to(player, ServerWsMessage::status("Waiting for a second player..."));
                return;
            }
            EnqueueOutcome::Paired(pairing) => pairing,
        };

        let room_id = self
            .registry
            .create(&pairing.mode, pairing.first, pairing.second);
        sink.join_room(&room_id, pairing.first);
        sink.join_room(&room_id, pairing.second);
        sink.emit_to_room(
            &room_id,
            ServerWsMessage::GameStart(GameStartData {
                room_id: room_id.clone(),
                mode: pairing.mode.clone(),
            }),
        );
        info!("[Coordinator] Game started in {} (mode {:?})", room_id, pairing.mode);
        self.drive(&room_id, scheduler, sink, |session, cx| {
            session.start_round(cx);
            Progress::Continued
        });
    }

    pub fn guess<S>(
        &mut self,
        player: PlayerId,
        room_id: &RoomId,
        round: Option<u32>,
        coords: Coordinates,
        scheduler: &mut S,
        sink: &mut dyn EventSink,
    ) -> Progress
    where
        S: RoundScheduler<Handle = H>,
    {
        self.drive(room_id, scheduler, sink, |session, cx| {
            session.submit_guess(player, round, coords, cx)
        })
    }

    pub fn round_timeout<S>(
        &mut self,
        room_id: &RoomId,
        round: u32,
        scheduler: &mut S,
        sink: &mut dyn EventSink,
    ) -> Progress
    where
        S: RoundScheduler<Handle = H>,
    {
        self.drive(room_id, scheduler, sink, |session, cx| {
            session.on_round_timeout(round, cx)
        })
    }

    /// Drop `player` from the queue and abort any room they sit in.
    pub fn disconnect<S>(&mut self, player: PlayerId, scheduler: &mut S, sink: &mut dyn EventSink)
    where
        S: RoundScheduler<Handle = H>,
    {
        if self.queue.dequeue(&player) {
            info!("[Coordinator] Queued player {} disconnected", player);
        }
        let Some(room_id) = self.registry.room_of(&player).cloned() else {
            return;
        };
        self.drive(&room_id, scheduler, sink, |session, cx| {
            session.abort(player, &mut *cx.scheduler, &mut *cx.sink)
        });
    }

    /// Run one transition on a room's session, destroying it if it finished.
    /// Events for unknown rooms are dropped.
    fn drive<S, F>(&mut self, room_id: &RoomId, scheduler: &mut S, sink: &mut dyn EventSink, step: F) -> Progress
    where
        S: RoundScheduler<Handle = H>,
        F: FnOnce(&mut GameSession<H>, &mut SessionContext<'_, S>) -> Progress,
    {
        let progress = {
            let Some(session) = self.registry.get_mut(room_id) else {
                debug!("[Coordinator] Event for unknown room {} dropped", room_id);
                return Progress::Ignored;
            };
            let mut cx = SessionContext {
                rules: &self.rules,
                rng: &mut self.rng,
                scheduler: &mut *scheduler,
                sink: &mut *sink,
            };
            step(session, &mut cx)
        };
        if progress == Progress::Finished {
            self.registry.destroy(room_id, scheduler);
            sink.close_room(room_id);
        }
        progress
    }
}

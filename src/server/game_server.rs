/// Game server actor.
///
/// The single actor that owns the session core. Every socket event and every
/// round timer is a message or a future on this actor's context, so all
/// state transitions are serialized without locks.
use std::collections::HashMap;
use std::time::Duration;

use actix::prelude::*;
use log::{debug, info};
use rand::rngs::StdRng;
use serde::Serialize;

use crate::server::coordinator::Coordinator;
use crate::server::game_session::registry::{RoomId, RoomIdGenerator};
use crate::server::game_session::session::Rules;
use crate::server::game_session::timer::RoundScheduler;
use crate::server::gateway::EventSink;
use crate::server::matchmaking::types::PlayerId;
use crate::server::messages::{GuessData, ServerWsMessage, WelcomeData};

/// Sockets and transport-level room membership.
#[derive(Default)]
pub struct SocketGateway {
    sockets: HashMap<PlayerId, Recipient<ServerWsMessage>>,
    rooms: HashMap<RoomId, Vec<PlayerId>>,
}

impl SocketGateway {
    fn connect(&mut self, player: PlayerId, addr: Recipient<ServerWsMessage>) {
        self.sockets.insert(player, addr);
    }

    fn disconnect(&mut self, player: &PlayerId) {
        self.sockets.remove(player);
    }

    pub fn connected(&self) -> usize {
        self.sockets.len()
    }
}

impl EventSink for SocketGateway {
    fn emit_to(&mut self, player: PlayerId, event: ServerWsMessage) {
        match self.sockets.get(&player) {
            Some(addr) => addr.do_send(event),
            None => debug!("[GameServer] No socket for {}, event dropped", player),
        }
    }

    fn join_room(&mut self, room: &RoomId, player: PlayerId) {
        self.rooms.entry(room.clone()).or_default().push(player);
    }

    fn emit_to_room(&mut self, room: &RoomId, event: ServerWsMessage) {
        let Some(members) = self.rooms.get(room) else {
            return;
        };
        for player in members {
            if let Some(addr) = self.sockets.get(player) {
                addr.do_send(event.clone());
            }
        }
    }

    fn close_room(&mut self, room: &RoomId) {
        self.rooms.remove(room);
    }
}

/// Round timers as futures on the game server's context.
struct ActorScheduler<'a> {
    ctx: &'a mut Context<GameServer>,
}

impl RoundScheduler for ActorScheduler<'_> {
    type Handle = SpawnHandle;

    fn schedule_round_timeout(&mut self, room_id: &RoomId, round: u32, after: Duration) -> SpawnHandle {
        let room_id = room_id.clone();
        self.ctx.run_later(after, move |act, ctx| {
            act.on_round_timeout(&room_id, round, ctx);
        })
    }

    fn cancel(&mut self, handle: SpawnHandle) {
        self.ctx.cancel_future(handle);
    }
}

pub struct GameServer {
    coordinator: Coordinator<SpawnHandle>,
    gateway: SocketGateway,
}

impl GameServer {
    pub fn new(rules: Rules, ids: Box<dyn RoomIdGenerator>, rng: StdRng) -> Self {
        Self {
            coordinator: Coordinator::new(rules, ids, rng),
            gateway: SocketGateway::default(),
        }
    }

    fn on_round_timeout(&mut self, room_id: &RoomId, round: u32, ctx: &mut Context<Self>) {
        let mut scheduler = ActorScheduler { ctx };
        self.coordinator
            .round_timeout(room_id, round, &mut scheduler, &mut self.gateway);
    }
}

impl Actor for GameServer {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!(
            "[GameServer] Started ({} rounds, {:?} per round)",
            self.coordinator.rules().config.max_rounds,
            self.coordinator.rules().config.round_duration
        );
    }
}

/// Message: a socket opened.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub player_id: PlayerId,
    pub addr: Recipient<ServerWsMessage>,
}

/// Message: player asks to be matched in a mode.
#[derive(Message)]
#[rtype(result = "()")]
pub struct JoinQueue {
    pub player_id: PlayerId,
    pub mode: String,
}

/// Message: player submits a guess for a room's current round.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SubmitGuess {
    pub player_id: PlayerId,
    pub guess: GuessData,
}

/// Message: a socket closed. Delivered once per player.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub player_id: PlayerId,
}

/// Message: snapshot of queue and room counts.
#[derive(Message)]
#[rtype(result = "ServerStats")]
pub struct GetStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, MessageResponse)]
pub struct ServerStats {
    pub queued: usize,
    pub rooms: usize,
    pub connected: usize,
}

impl Handler<Connect> for GameServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        debug!("[GameServer] Player {} connected", msg.player_id);
        self.gateway.connect(msg.player_id, msg.addr);
        self.gateway.emit_to(
            msg.player_id,
            ServerWsMessage::Welcome(WelcomeData {
                player_id: msg.player_id,
            }),
        );
    }
}

impl Handler<JoinQueue> for GameServer {
    type Result = ();

    fn handle(&mut self, msg: JoinQueue, ctx: &mut Self::Context) -> Self::Result {
        let mut scheduler = ActorScheduler { ctx };
        self.coordinator
            .join(msg.player_id, &msg.mode, &mut scheduler, &mut self.gateway);
    }
}

impl Handler<SubmitGuess> for GameServer {
    type Result = ();

    fn handle(&mut self, msg: SubmitGuess, ctx: &mut Self::Context) -> Self::Result {
        let mut scheduler = ActorScheduler { ctx };
        self.coordinator.guess(
            msg.player_id,
            &msg.guess.room_id,
            msg.guess.round,
            msg.guess.coordinates(),
            &mut scheduler,
            &mut self.gateway,
        );
    }
}

impl Handler<Disconnect> for GameServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, ctx: &mut Self::Context) -> Self::Result {
        debug!("[GameServer] Player {} disconnected", msg.player_id);
        let mut scheduler = ActorScheduler { ctx };
        self.coordinator
            .disconnect(msg.player_id, &mut scheduler, &mut self.gateway);
        self.gateway.disconnect(&msg.player_id);
    }
}

impl Handler<GetStats> for GameServer {
    type Result = ServerStats;

    fn handle(&mut self, _msg: GetStats, _ctx: &mut Self::Context) -> Self::Result {
        ServerStats {
            queued: self.coordinator.queue().len(),
            rooms: self.coordinator.registry().len(),
            connected: self.gateway.connected(),
        }
    }
}

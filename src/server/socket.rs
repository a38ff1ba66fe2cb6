/// WebSocket session handler for one connected player.
///
/// This actor owns a single player's connection: it registers the player with
/// the game server on start, relays parsed client messages (join, guess),
/// reports the disconnect when it stops, and serializes server events back to
/// the client.
use actix::prelude::*;
use actix_web::{Error, HttpRequest, HttpResponse, web};
use actix_web_actors::ws;
use log::{debug, warn};
use uuid::Uuid;

use super::game_server::{Connect, Disconnect, GameServer, JoinQueue, SubmitGuess};
use super::matchmaking::types::PlayerId;
use super::messages::{ClientWsMessage, ServerWsMessage};
use super::ws_error::ws_error_message;

pub struct PlayerSocket {
    pub player_id: PlayerId,
    pub server: Addr<GameServer>,
}

impl Actor for PlayerSocket {
    type Context = ws::WebsocketContext<Self>;

    /// Registers the player with the game server.
    fn started(&mut self, ctx: &mut Self::Context) {
        self.server.do_send(Connect {
            player_id: self.player_id,
            addr: ctx.address().recipient(),
        });
    }

    /// Removes the player from the queue and any room.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.server.do_send(Disconnect {
            player_id: self.player_id,
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => match serde_json::from_str::<ClientWsMessage>(&text) {
                Ok(ClientWsMessage::JoinQueue { mode }) => {
                    self.server.do_send(JoinQueue {
                        player_id: self.player_id,
                        mode,
                    });
                }
                Ok(ClientWsMessage::SendGuess(guess)) => {
                    self.server.do_send(SubmitGuess {
                        player_id: self.player_id,
                        guess,
                    });
                }
                Ok(ClientWsMessage::Ping) => {}
                Err(e) => {
                    debug!("[Socket] Invalid message from {}: {}", self.player_id, e);
                    ctx.text(ws_error_message("INVALID_MESSAGE", "Invalid client message"));
                }
            },
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                warn!("[Socket] Protocol error for {}: {}", self.player_id, e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<ServerWsMessage> for PlayerSocket {
    type Result = ();

    fn handle(&mut self, msg: ServerWsMessage, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                warn!("[Socket] Failed to serialize event for {}: {}", self.player_id, e);
                ctx.text(ws_error_message("INTERNAL", "Internal server error"));
            }
        }
    }
}

/// WebSocket endpoint. Each connection gets a fresh player id.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(
        PlayerSocket {
            player_id: Uuid::new_v4(),
            server: data.game_server.clone(),
        },
        &req,
        stream,
    )
}

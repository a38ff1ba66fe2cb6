// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the game server actor address shared by the WebSocket handlers.

use actix::Addr;
use crate::server::game_server::GameServer;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the game server actor (queue, rooms, round timers).
    pub game_server: Addr<GameServer>,
}

impl AppState {
    pub fn new(game_server: Addr<GameServer>) -> Self {
        AppState { game_server }
    }
}

// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the session core and its transport, including:
//! - Matchmaking queue and room registry
//! - Per-room round state machine
//! - The game server actor and per-connection WebSocket actors
//! - Wire messages and routing

pub mod coordinator;
pub mod game_server;
pub mod game_session;
pub mod gateway;
pub mod matchmaking;
pub mod messages;
pub mod router;
pub mod socket;
pub mod state;
pub mod ws_error;

#[cfg(test)]
pub mod test_support;

//! WebSocket wire messages.
//!
//! Client frames are `{"action": ..., "data": ...}`; server frames are
//! `{"event": ..., "data": ...}`. Both sides are JSON.

use std::collections::HashMap;

use actix::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

use crate::game::types::{Coordinates, Location};
use crate::server::game_session::registry::RoomId;
use crate::server::matchmaking::types::PlayerId;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum ClientWsMessage {
    JoinQueue { mode: String },
    SendGuess(GuessData),
    Ping,
}

/// A guess as sent by the client. Missing coordinates are kept as unknown
/// rather than rejected; they simply score zero. `round`, when present,
/// pins the guess to the round the client was answering.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuessData {
    pub room_id: RoomId,
    #[serde(default)]
    pub round: Option<u32>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lng: Option<f64>,
}

/// Any non-numeric value reads as an unknown coordinate.
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)?.as_f64())
}

impl GuessData {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat.unwrap_or(f64::NAN), self.lng.unwrap_or(f64::NAN))
    }
}

// Server -> client
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerWsMessage {
    Welcome(WelcomeData),
    Status(String),
    GameStart(GameStartData),
    NewRound(NewRoundData),
    StartTimer,
    RoundEnd(RoundEndData),
    GameEnd(GameEndData),
    OpponentDisconnected,
    Error(ErrorData),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeData {
    pub player_id: PlayerId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameStartData {
    pub room_id: RoomId,
    pub mode: String,
}

/// Round announcement. Carries coordinates only, never the location name.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NewRoundData {
    pub round: u32,
    pub location: Coordinates,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GuessResult {
    pub distance: f64,
    pub score: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundEndData {
    pub round: u32,
    pub real_location: Location,
    pub guesses: HashMap<PlayerId, Coordinates>,
    pub results: HashMap<PlayerId, GuessResult>,
    /// `None` when nobody guessed.
    pub winner: Option<PlayerId>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameEndData {
    pub total_scores: HashMap<PlayerId, u32>,
    pub final_winner: PlayerId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorData {
    pub code: String,
    pub message: String,
}

impl ServerWsMessage {
    pub fn status(message: &str) -> Self {
        Self::Status(message.to_string())
    }
    pub fn error(code: &str, message: &str) -> Self {
        Self::Error(ErrorData {
            code: code.to_string(),
            message: message.to_string(),
        })
    }
}

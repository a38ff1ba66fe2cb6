/// Matchmaking module: waiting players and same-mode pairing.

pub mod queue;
pub mod types;

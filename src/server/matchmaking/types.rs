use uuid::Uuid;

/// Transport-assigned identifier, unique for the lifetime of a connection.
pub type PlayerId = Uuid;

/// A player waiting for an opponent in a given mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    pub player: PlayerId,
    pub mode: String,
}

/// Two players taken out of the queue together, longest-waiting first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pairing {
    pub mode: String,
    pub first: PlayerId,
    pub second: PlayerId,
}

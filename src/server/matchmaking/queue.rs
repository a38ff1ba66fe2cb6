/// Matchmaking queue.
///
/// Holds waiting players in insertion order and pairs the two longest-waiting
/// players of a mode as soon as a join makes that possible. The queue knows
/// nothing about sessions; the caller turns a `Pairing` into a room.
use log::{debug, info};

use super::types::{Pairing, PlayerId, QueueEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The player was already waiting; nothing changed.
    AlreadyQueued,
    /// The player is now waiting for an opponent.
    Waiting,
    /// The join completed a pair; both entries have left the queue.
    Paired(Pairing),
}

#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: Vec<QueueEntry>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.entries.iter().any(|e| &e.player == player)
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Append `player` for `mode`, then produce at most one pairing for that mode.
    pub fn enqueue(&mut self, player: PlayerId, mode: &str) -> EnqueueOutcome {
        if self.contains(&player) {
            debug!("[Matchmaking] Player {} already queued, join ignored", player);
            return EnqueueOutcome::AlreadyQueued;
        }
        self.entries.push(QueueEntry {
            player,
            mode: mode.to_string(),
        });
        debug!("[Matchmaking] Player {} queued for mode {:?}", player, mode);

        match self.take_pair(mode) {
            Some(pairing) => {
                info!(
                    "[Matchmaking] Paired {} and {} for mode {:?}",
                    pairing.first, pairing.second, pairing.mode
                );
                EnqueueOutcome::Paired(pairing)
            }
            None => EnqueueOutcome::Waiting,
        }
    }

    /// Remove any entry for `player`. Returns whether one was present.
    pub fn dequeue(&mut self, player: &PlayerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.player != player);
        let removed = self.entries.len() != before;
        if removed {
            debug!("[Matchmaking] Player {} left the queue", player);
        }
        removed
    }

    fn take_pair(&mut self, mode: &str) -> Option<Pairing> {
        let mut same_mode = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.mode == mode)
            .map(|(idx, _)| idx);
        let first_idx = same_mode.next()?;
        let second_idx = same_mode.next()?;

        // Remove the later index first so the earlier one stays valid.
        let second = self.entries.remove(second_idx);
        let first = self.entries.remove(first_idx);
        Some(Pairing {
            mode: mode.to_string(),
            first: first.player,
            second: second.player,
        })
    }
}

/// One guess-and-score cycle of a session.
///
/// A round collects at most one guess per player and is scored exactly once;
/// after `finalize` it refuses further guesses and further scoring.
use std::collections::HashMap;

use crate::game::geo::distance_km;
use crate::game::score::ScoreCalculator;
use crate::game::types::{Coordinates, Location};
use crate::server::matchmaking::types::PlayerId;
use crate::server::messages::GuessResult;

#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub results: HashMap<PlayerId, GuessResult>,
    pub winner: Option<PlayerId>,
}

#[derive(Debug, Clone)]
pub struct Round {
    index: u32,
    location: Location,
    guesses: HashMap<PlayerId, Coordinates>,
    outcome: Option<RoundOutcome>,
}

impl Round {
    pub fn new(index: u32, location: Location) -> Self {
        Self {
            index,
            location,
            guesses: HashMap::new(),
            outcome: None,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn guesses(&self) -> &HashMap<PlayerId, Coordinates> {
        &self.guesses
    }

    pub fn has_guessed(&self, player: &PlayerId) -> bool {
        self.guesses.contains_key(player)
    }

    pub fn is_finalized(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&RoundOutcome> {
        self.outcome.as_ref()
    }

    /// Record `player`'s guess. Returns `false` if the round is closed or they already guessed.
    pub fn record_guess(&mut self, player: PlayerId, coords: Coordinates) -> bool {
        if self.is_finalized() || self.has_guessed(&player) {
            return false;
        }
        self.guesses.insert(player, coords);
        true
    }

    /// Score every recorded guess and close the round.
    ///
    /// `players` fixes the tie-break order for the round winner. Returns `None`
    /// if the round was already finalized.
    pub fn finalize(&mut self, players: &[PlayerId], scorer: &ScoreCalculator) -> Option<&RoundOutcome> {
        if self.is_finalized() {
            return None;
        }
        let target = self.location.coordinates();
        let results: HashMap<PlayerId, GuessResult> = self
            .guesses
            .iter()
            .map(|(player, guess)| {
                let distance = distance_km(*guess, target);
                let score = scorer.score(distance);
                (*player, GuessResult { distance, score })
            })
            .collect();
        let winner = leader(players, |p| results.get(p).map(|r| r.score));
        self.outcome = Some(RoundOutcome { results, winner });
        self.outcome.as_ref()
    }
}

/// Highest-scoring player in `players` order; ties keep the earlier player.
/// Players without a score are skipped.
pub fn leader<F>(players: &[PlayerId], score_of: F) -> Option<PlayerId>
where
    F: Fn(&PlayerId) -> Option<u32>,
{
    let mut best: Option<(PlayerId, u32)> = None;
    for player in players {
        let Some(score) = score_of(player) else {
            continue;
        };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((*player, score)),
        }
    }
    best.map(|(player, _)| player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn minsk_round() -> Round {
        Round::new(1, Location::new(53.9, 27.57, "Minsk"))
    }

    #[test]
    fn test_one_guess_per_player() {
        let mut round = minsk_round();
        let a = Uuid::new_v4();
        assert!(round.record_guess(a, Coordinates::new(53.9, 27.57)));
        assert!(!round.record_guess(a, Coordinates::new(0.0, 0.0)));
        assert_eq!(round.guesses()[&a], Coordinates::new(53.9, 27.57));
    }

    #[test]
    fn test_exact_guess_wins() {
        let mut round = minsk_round();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        round.record_guess(a, Coordinates::new(53.9, 27.57));
        round.record_guess(b, Coordinates::new(49.4, 27.57));
        let outcome = round.finalize(&[a, b], &ScoreCalculator::default()).unwrap().clone();
        assert_eq!(outcome.results[&a].score, 5000);
        assert_eq!(outcome.results[&a].distance, 0.0);
        assert_eq!(outcome.results[&b].score, 0);
        assert_eq!(outcome.winner, Some(a));
    }

    #[test]
    fn test_finalize_only_once() {
        let mut round = minsk_round();
        let a = Uuid::new_v4();
        round.record_guess(a, Coordinates::new(53.9, 27.57));
        assert!(round.finalize(&[a], &ScoreCalculator::default()).is_some());
        assert!(round.finalize(&[a], &ScoreCalculator::default()).is_none());
        assert!(!round.record_guess(Uuid::new_v4(), Coordinates::new(1.0, 1.0)));
    }

    #[test]
    fn test_missing_guess_has_no_result() {
        let mut round = minsk_round();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        round.record_guess(b, Coordinates::new(54.0, 27.6));
        let outcome = round.finalize(&[a, b], &ScoreCalculator::default()).unwrap();
        assert!(!outcome.results.contains_key(&a));
        assert_eq!(outcome.winner, Some(b));
    }

    #[test]
    fn test_no_guesses_no_winner() {
        let mut round = minsk_round();
        let outcome = round
            .finalize(&[Uuid::new_v4(), Uuid::new_v4()], &ScoreCalculator::default())
            .unwrap();
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.winner, None);
    }

    #[test]
    fn test_leader_ties_favour_first_listed() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(leader(&[a, b], |_| Some(100)), Some(a));
        assert_eq!(leader(&[b, a], |_| Some(100)), Some(b));
        assert_eq!(leader(&[a, b], |p| Some(if *p == b { 2 } else { 1 })), Some(b));
        assert_eq!(leader(&[a, b], |_| None), None);
    }
}

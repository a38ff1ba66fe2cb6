/// Per-room round state machine.
///
/// `AwaitingGuesses(n)` -> `RoundFinalizing` -> `AwaitingGuesses(n + 1)` or
/// `Completed`. Disconnects move any non-terminal session to `Aborted`.
/// A session never removes itself from the registry; it reports `Finished`
/// and the caller destroys it.
use std::collections::HashMap;

use log::{debug, info};
use rand::rngs::StdRng;

use super::registry::RoomId;
use super::round::{Round, leader};
use super::timer::RoundScheduler;
use crate::config::game::GameConfig;
use crate::game::catalog::LocationCatalog;
use crate::game::score::ScoreCalculator;
use crate::game::types::Coordinates;
use crate::server::gateway::EventSink;
use crate::server::matchmaking::types::PlayerId;
use crate::server::messages::{GameEndData, NewRoundData, RoundEndData, ServerWsMessage};

/// Immutable rules shared by every session.
#[derive(Debug, Clone)]
pub struct Rules {
    pub config: GameConfig,
    pub scorer: ScoreCalculator,
    pub catalog: LocationCatalog,
}

impl Rules {
    pub fn new(config: GameConfig, catalog: LocationCatalog) -> Self {
        Self {
            scorer: ScoreCalculator::from_config(&config),
            config,
            catalog,
        }
    }
}

/// Everything a session transition may touch outside itself.
pub struct SessionContext<'a, S> {
    pub rules: &'a Rules,
    pub rng: &'a mut StdRng,
    pub scheduler: &'a mut S,
    pub sink: &'a mut dyn EventSink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Created, round 1 not started yet.
    Pending,
    AwaitingGuesses,
    RoundFinalizing,
    Completed,
    Aborted,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Aborted)
    }
}

/// Result of feeding an event to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Stale or duplicate event; nothing changed.
    Ignored,
    Continued,
    /// The session reached a terminal state and must be destroyed.
    Finished,
}

pub struct GameSession<H> {
    room_id: RoomId,
    mode: String,
    players: [PlayerId; 2],
    rounds: Vec<Round>,
    cumulative_scores: HashMap<PlayerId, u32>,
    status: SessionStatus,
    timer: Option<H>,
}

impl<H> GameSession<H> {
    pub fn new(room_id: RoomId, mode: &str, players: [PlayerId; 2]) -> Self {
        Self {
            room_id,
            mode: mode.to_string(),
            players,
            rounds: Vec::new(),
            cumulative_scores: players.iter().map(|p| (*p, 0)).collect(),
            status: SessionStatus::Pending,
            timer: None,
        }
    }

    pub fn players(&self) -> &[PlayerId; 2] {
        &self.players
    }

    /// 1-based index of the current round; 0 before round 1 starts.
    pub fn current_round_index(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn take_timer(&mut self) -> Option<H> {
        self.timer.take()
    }

    /// Pick the next location and announce the round (coordinates only).
    pub fn start_round<S>(&mut self, cx: &mut SessionContext<'_, S>)
    where
        S: RoundScheduler<Handle = H>,
    {
        if self.status.is_terminal() {
            return;
        }
        let location = cx
            .rules
            .catalog
            .pick(&self.mode, &cx.rules.config.fallback_location, &mut *cx.rng);
        let index = self.current_round_index() + 1;
        let announcement = NewRoundData {
            round: index,
            location: location.coordinates(),
        };
        self.rounds.push(Round::new(index, location));
        self.status = SessionStatus::AwaitingGuesses;
        info!("[GameSession] Room {} round {} started", self.room_id, index);
        cx.sink
            .emit_to_room(&self.room_id, ServerWsMessage::NewRound(announcement));
    }

    /// Record a guess. The first guess of a round starts the countdown, the
    /// second finalizes the round immediately. A guess naming another round
    /// is dropped.
    pub fn submit_guess<S>(
        &mut self,
        player: PlayerId,
        round: Option<u32>,
        coords: Coordinates,
        cx: &mut SessionContext<'_, S>,
    ) -> Progress
    where
        S: RoundScheduler<Handle = H>,
    {
        if self.status != SessionStatus::AwaitingGuesses || !self.players.contains(&player) {
            debug!(
                "[GameSession] Guess from {} ignored in room {} ({:?})",
                player, self.room_id, self.status
            );
            return Progress::Ignored;
        }
        if let Some(target) = round.filter(|r| *r != self.current_round_index()) {
            debug!(
                "[GameSession] Guess from {} for round {} ignored in room {} (now {})",
                player,
                target,
                self.room_id,
                self.current_round_index()
            );
            return Progress::Ignored;
        }
        let Some(round) = self.rounds.last_mut() else {
            return Progress::Ignored;
        };
        if !round.record_guess(player, coords) {
            debug!(
                "[GameSession] Duplicate guess from {} in room {} round {}",
                player,
                self.room_id,
                round.index()
            );
            return Progress::Ignored;
        }
        let (index, guess_count) = (round.index(), round.guesses().len());

        if guess_count < self.players.len() {
            if let Some(stale) = self.timer.take() {
                cx.scheduler.cancel(stale);
            }
            let handle = cx.scheduler.schedule_round_timeout(
                &self.room_id,
                index,
                cx.rules.config.round_duration,
            );
            self.timer = Some(handle);
            debug!("[GameSession] Room {} round {} countdown started", self.room_id, index);
            cx.sink.emit_to_room(&self.room_id, ServerWsMessage::StartTimer);
            return Progress::Continued;
        }
        self.finalize_round(cx)
    }

    /// Timer expiry for `round`. Ignored unless that round is still open.
    pub fn on_round_timeout<S>(&mut self, round: u32, cx: &mut SessionContext<'_, S>) -> Progress
    where
        S: RoundScheduler<Handle = H>,
    {
        if round != self.current_round_index() {
            debug!(
                "[GameSession] Stale timeout for round {} in room {} (now {})",
                round,
                self.room_id,
                self.current_round_index()
            );
            return Progress::Ignored;
        }
        // The handle has already fired.
        self.timer = None;
        info!("[GameSession] Room {} round {} timed out", self.room_id, round);
        self.finalize_round(cx)
    }

    /// Score the current round, broadcast results, then start the next round
    /// or end the game. Calling it again for the same round does nothing.
    pub fn finalize_round<S>(&mut self, cx: &mut SessionContext<'_, S>) -> Progress
    where
        S: RoundScheduler<Handle = H>,
    {
        if self.status != SessionStatus::AwaitingGuesses {
            return Progress::Ignored;
        }
        let Some(round) = self.rounds.last_mut() else {
            return Progress::Ignored;
        };
        if round.finalize(&self.players, &cx.rules.scorer).is_none() {
            return Progress::Ignored;
        }
        let Some(outcome) = round.outcome() else {
            return Progress::Ignored;
        };
        self.status = SessionStatus::RoundFinalizing;
        if let Some(handle) = self.timer.take() {
            cx.scheduler.cancel(handle);
        }

        for (player, result) in &outcome.results {
            *self.cumulative_scores.entry(*player).or_insert(0) += result.score;
        }
        let summary = RoundEndData {
            round: round.index(),
            real_location: round.location().clone(),
            guesses: round.guesses().clone(),
            results: outcome.results.clone(),
            winner: outcome.winner,
        };
        info!(
            "[GameSession] Room {} round {} finalized, winner {:?}",
            self.room_id, summary.round, summary.winner
        );
        let finished_index = summary.round;
        cx.sink
            .emit_to_room(&self.room_id, ServerWsMessage::RoundEnd(summary));

        if finished_index < cx.rules.config.max_rounds {
            self.start_round(cx);
            return Progress::Continued;
        }
        self.complete(&mut *cx.sink);
        Progress::Finished
    }

    /// Opponent-disconnected abort. Safe to call repeatedly.
    pub fn abort<S>(&mut self, leaver: PlayerId, scheduler: &mut S, sink: &mut dyn EventSink) -> Progress
    where
        S: RoundScheduler<Handle = H>,
    {
        if self.status.is_terminal() {
            return Progress::Ignored;
        }
        if let Some(handle) = self.timer.take() {
            scheduler.cancel(handle);
        }
        self.status = SessionStatus::Aborted;
        info!("[GameSession] Room {} aborted, {} disconnected", self.room_id, leaver);
        for player in self.players.iter().filter(|p| **p != leaver) {
            sink.emit_to(*player, ServerWsMessage::OpponentDisconnected);
        }
        Progress::Finished
    }

    fn complete(&mut self, sink: &mut dyn EventSink) {
        self.status = SessionStatus::Completed;
        let final_winner = leader(&self.players, |p| self.cumulative_scores.get(p).copied())
            .unwrap_or(self.players[0]);
        info!(
            "[GameSession] Room {} completed, winner {} ({:?})",
            self.room_id, final_winner, self.cumulative_scores
        );
        sink.emit_to_room(
            &self.room_id,
            ServerWsMessage::GameEnd(GameEndData {
                total_scores: self.cumulative_scores.clone(),
                final_winner,
            }),
        );
    }
}

#[cfg(test)]
impl<H> GameSession<H> {
    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.last()
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn cumulative_scores(&self) -> &HashMap<PlayerId, u32> {
        &self.cumulative_scores
    }

    pub fn has_pending_timer(&self) -> bool {
        self.timer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::test_support::{ManualScheduler, RecordingSink};
    use rand::SeedableRng;
    use uuid::Uuid;

    struct Fixture {
        rules: Rules,
        rng: StdRng,
        scheduler: ManualScheduler,
        sink: RecordingSink,
        session: GameSession<u64>,
    }

    impl Fixture {
        fn new(max_rounds: u32) -> Self {
            let config = GameConfig {
                max_rounds,
                ..GameConfig::default()
            };
            let catalog = LocationCatalog::from_json(
                r#"{"cities": [{"lat": 53.9, "lng": 27.57, "name": "Minsk"}]}"#,
            )
            .unwrap();
            let room = RoomId::from("room-1");
            let players = [Uuid::new_v4(), Uuid::new_v4()];
            let mut sink = RecordingSink::default();
            for player in players {
                crate::server::gateway::EventSink::join_room(&mut sink, &room, player);
            }
            Self {
                rules: Rules::new(config, catalog),
                rng: StdRng::seed_from_u64(11),
                scheduler: ManualScheduler::default(),
                sink,
                session: GameSession::new(room, "cities", players),
            }
        }

        fn players(&self) -> [PlayerId; 2] {
            *self.session.players()
        }

        fn start(&mut self) {
            let mut cx = SessionContext {
                rules: &self.rules,
                rng: &mut self.rng,
                scheduler: &mut self.scheduler,
                sink: &mut self.sink,
            };
            self.session.start_round(&mut cx);
        }

        fn guess(&mut self, player: PlayerId) -> Progress {
            let mut cx = SessionContext {
                rules: &self.rules,
                rng: &mut self.rng,
                scheduler: &mut self.scheduler,
                sink: &mut self.sink,
            };
            self.session
                .submit_guess(player, None, Coordinates::new(53.9, 27.57), &mut cx)
        }

        fn timeout(&mut self, round: u32) -> Progress {
            let mut cx = SessionContext {
                rules: &self.rules,
                rng: &mut self.rng,
                scheduler: &mut self.scheduler,
                sink: &mut self.sink,
            };
            self.session.on_round_timeout(round, &mut cx)
        }

        fn finalize(&mut self) -> Progress {
            let mut cx = SessionContext {
                rules: &self.rules,
                rng: &mut self.rng,
                scheduler: &mut self.scheduler,
                sink: &mut self.sink,
            };
            self.session.finalize_round(&mut cx)
        }

        fn round_end_count(&self, player: &PlayerId) -> usize {
            self.sink
                .count(player, |m| matches!(m, ServerWsMessage::RoundEnd(_)))
        }
    }

    #[test]
    fn test_starts_pending_then_awaits_guesses() {
        let mut f = Fixture::new(5);
        assert_eq!(f.session.status(), SessionStatus::Pending);
        assert_eq!(f.session.current_round_index(), 0);
        f.start();
        assert_eq!(f.session.status(), SessionStatus::AwaitingGuesses);
        assert_eq!(f.session.current_round_index(), 1);
        assert_eq!(f.session.rounds().len(), 1);
    }

    #[test]
    fn test_guess_before_start_is_ignored() {
        let mut f = Fixture::new(5);
        let [a, _] = f.players();
        assert_eq!(f.guess(a), Progress::Ignored);
    }

    #[test]
    fn test_finalize_twice_counts_once() {
        let mut f = Fixture::new(1);
        let [a, _] = f.players();
        f.start();
        f.guess(a);
        assert_eq!(f.finalize(), Progress::Finished);
        assert_eq!(f.finalize(), Progress::Ignored);
        assert_eq!(f.timeout(1), Progress::Ignored);
        assert_eq!(f.session.cumulative_scores()[&a], 5000);
        assert_eq!(f.round_end_count(&a), 1);
        assert_eq!(f.session.status(), SessionStatus::Completed);
        assert!(!f.session.has_pending_timer());
    }

    #[test]
    fn test_stale_timeout_does_not_touch_next_round() {
        let mut f = Fixture::new(5);
        let [a, b] = f.players();
        f.start();
        f.guess(a);
        f.guess(b);
        assert_eq!(f.session.current_round_index(), 2);
        assert_eq!(f.timeout(1), Progress::Ignored);
        assert!(!f.session.current_round().unwrap().is_finalized());
        assert_eq!(f.round_end_count(&a), 1);
    }

    #[test]
    fn test_rounds_grow_with_index() {
        let mut f = Fixture::new(3);
        let [a, b] = f.players();
        f.start();
        for expected in 1..=3u32 {
            assert_eq!(f.session.rounds().len() as u32, f.session.current_round_index());
            assert_eq!(f.session.current_round_index(), expected);
            f.guess(a);
            f.guess(b);
        }
        assert_eq!(f.session.status(), SessionStatus::Completed);
        assert_eq!(f.session.rounds().len(), 3);
    }

    #[test]
    fn test_abort_is_idempotent() {
        let mut f = Fixture::new(5);
        let [a, b] = f.players();
        f.start();
        f.guess(a);
        assert!(f.session.has_pending_timer());

        assert_eq!(
            f.session.abort(b, &mut f.scheduler, &mut f.sink),
            Progress::Finished
        );
        assert_eq!(
            f.session.abort(a, &mut f.scheduler, &mut f.sink),
            Progress::Ignored
        );
        assert_eq!(f.session.status(), SessionStatus::Aborted);
        assert!(!f.session.has_pending_timer());
        assert!(f.scheduler.pending.is_empty());
        assert_eq!(
            f.sink.count(&a, |m| *m == ServerWsMessage::OpponentDisconnected),
            1
        );
        assert_eq!(
            f.sink.count(&b, |m| *m == ServerWsMessage::OpponentDisconnected),
            0
        );
        assert_eq!(f.guess(b), Progress::Ignored);
    }
}

//! Tournament lifecycle controller.
//!
//! `TournamentManager` owns the entity arena and is the single entry point
//! external layers call: roster supply, lifecycle transitions, outcome
//! recording and the read-only query surface. Every mutating operation
//! validates and builds its complete effect first and only then touches the
//! store, so a failure never leaves partial state (a round without games, a
//! half-applied rating batch). `&mut self` on the mutating operations
//! serializes callers per manager instance; independent managers never
//! block each other.

use chrono::Utc;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    Game, GameId, GameView, Outcome, Participant, ParticipantId, Player, PlayerId, Rating, Round,
    RoundId, RoundSummary, Score, StandingsEntry, Tournament, TournamentConfig, TournamentDetails,
    TournamentId, TournamentInfo, TournamentState,
};
use super::store::TournamentStore;
use crate::pairing::{self, RoundPairings};
use crate::planner::plan_rounds;
use crate::rating::elo;
use crate::standings::{StandingInput, resolve};

/// What `advance_round` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundAdvance {
    /// A new round exists and its pairings are ready.
    RoundGenerated(u32),
    /// The last round was already current; placements and ratings are final.
    Finished,
}

/// Timing hook invoked after observed operations with the operation name
/// and its wall-clock duration.
pub type TimingObserver = Box<dyn Fn(&'static str, Duration) + Send + Sync>;

/// Tournament manager
pub struct TournamentManager {
    store: TournamentStore,
    observer: Option<TimingObserver>,
}

impl Default for TournamentManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TournamentManager {
    /// Create a manager over an empty store.
    pub fn new() -> Self {
        Self {
            store: TournamentStore::new(),
            observer: None,
        }
    }

    /// Resume from a store the caller persisted earlier.
    pub fn from_store(store: TournamentStore) -> Self {
        Self {
            store,
            observer: None,
        }
    }

    /// Install a timing observer for the lifecycle operations.
    pub fn with_observer(
        mut self,
        observer: impl Fn(&'static str, Duration) + Send + Sync + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The arena, for the caller-owned persistence layer to snapshot.
    pub fn store(&self) -> &TournamentStore {
        &self.store
    }

    /// Hand the arena back to the caller.
    pub fn into_store(self) -> TournamentStore {
        self.store
    }

    fn emit(&self, operation: &'static str, elapsed: Duration) {
        if let Some(observer) = &self.observer {
            observer(operation, elapsed);
        }
    }

    // Roster

    /// Add a player to the global roster.
    pub fn add_player(&mut self, name: impl Into<String>, rating: Rating) -> PlayerId {
        let player = Player {
            id: Uuid::new_v4(),
            name: name.into(),
            rating,
        };
        let id = player.id;
        debug!("added player {id} rated {rating}");
        self.store.insert_player(player);
        id
    }

    pub fn player(&self, id: PlayerId) -> TournamentResult<&Player> {
        self.store
            .player(id)
            .ok_or(TournamentError::PlayerNotFound(id))
    }

    pub fn player_rating(&self, id: PlayerId) -> TournamentResult<Rating> {
        Ok(self.player(id)?.rating)
    }

    // Lifecycle

    /// Create a tournament in the `NotStarted` state.
    pub fn create_tournament(&mut self, config: TournamentConfig) -> TournamentResult<TournamentId> {
        if config.prize_positions < 1 {
            return Err(TournamentError::InvalidConfiguration {
                reason: "at least one prize position is required".into(),
            });
        }
        if !config.rating_k.is_finite() || config.rating_k <= 0.0 {
            return Err(TournamentError::InvalidConfiguration {
                reason: format!("rating K must be positive, got {}", config.rating_k),
            });
        }

        let id = self.store.alloc_id();
        self.store.insert_tournament(Tournament {
            id,
            name: config.name.clone(),
            prize_positions: config.prize_positions,
            pairing_method: config.pairing_method,
            state: TournamentState::NotStarted,
            current_round: 0,
            total_rounds: 0,
            rating_k: config.rating_k,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        });
        info!("created tournament {id} ({})", config.name);
        Ok(id)
    }

    /// Sign a player up for a tournament that has not started.
    pub fn register_player(
        &mut self,
        tournament_id: TournamentId,
        player_id: PlayerId,
    ) -> TournamentResult<ParticipantId> {
        let tournament = self.tournament(tournament_id)?;
        if tournament.state != TournamentState::NotStarted {
            return Err(TournamentError::InvalidTransition {
                expected: TournamentState::NotStarted,
                actual: tournament.state,
            });
        }
        let rating = self.player(player_id)?.rating;
        if self
            .store
            .participant_by_player(tournament_id, player_id)
            .is_some()
        {
            return Err(TournamentError::AlreadyRegistered {
                player: player_id,
                tournament: tournament_id,
            });
        }

        let id = self.store.alloc_id();
        self.store.insert_participant(Participant {
            id,
            tournament: tournament_id,
            player: player_id,
            initial_rating: rating,
            score: Score::ZERO,
            games_played: 0,
            had_bye: false,
            final_placement: None,
        });
        debug!("registered player {player_id} for tournament {tournament_id}");
        Ok(id)
    }

    /// Create a tournament for an already-assembled roster and start it in
    /// one call.
    ///
    /// The roster is validated in full before anything is created, so a
    /// failure leaves no trace of the tournament.
    pub fn plan_and_start_tournament(
        &mut self,
        config: TournamentConfig,
        roster: &[PlayerId],
    ) -> TournamentResult<TournamentId> {
        if roster.len() < 2 {
            return Err(TournamentError::InsufficientPlayers {
                needed: 2,
                current: roster.len(),
            });
        }
        plan_rounds(roster.len(), config.prize_positions)?;
        let mut distinct = BTreeSet::new();
        for &player_id in roster {
            self.player(player_id)?;
            if !distinct.insert(player_id) {
                return Err(TournamentError::InvalidConfiguration {
                    reason: format!("player {player_id} appears twice in the roster"),
                });
            }
        }

        let id = self.create_tournament(config)?;
        for &player_id in roster {
            self.register_player(id, player_id)?;
        }
        self.start_tournament(id)?;
        Ok(id)
    }

    /// Start a tournament: plan the round count, create every round record
    /// up front, pair round one, and become `Active`.
    ///
    /// Returns the planned number of rounds.
    pub fn start_tournament(&mut self, id: TournamentId) -> TournamentResult<u32> {
        let started = Instant::now();
        let result = self.start_tournament_inner(id);
        self.emit("start_tournament", started.elapsed());
        result
    }

    fn start_tournament_inner(&mut self, id: TournamentId) -> TournamentResult<u32> {
        let tournament = self.tournament(id)?;
        if tournament.state != TournamentState::NotStarted {
            return Err(TournamentError::InvalidTransition {
                expected: TournamentState::NotStarted,
                actual: tournament.state,
            });
        }
        let method = tournament.pairing_method;
        let prize_positions = tournament.prize_positions;

        let participants = self.store.participants_of(id);
        if participants.len() < 2 {
            return Err(TournamentError::InsufficientPlayers {
                needed: 2,
                current: participants.len(),
            });
        }
        let total_rounds = plan_rounds(participants.len(), prize_positions)?;

        // Snapshot ratings and fix the seeding order before any mutation.
        let mut seeded: Vec<(ParticipantId, Rating)> = participants
            .iter()
            .map(|p| {
                let rating = self
                    .store
                    .player(p.player)
                    .map(|player| player.rating)
                    .ok_or(TournamentError::PlayerNotFound(p.player))?;
                Ok((p.id, rating))
            })
            .collect::<TournamentResult<_>>()?;
        seeded.sort_by(|(id_a, rating_a), (id_b, rating_b)| {
            rating_b.cmp(rating_a).then(id_a.cmp(id_b))
        });
        let seeds: Vec<ParticipantId> = seeded.iter().map(|&(id, _)| id).collect();

        let pairings = pairing::generate_first_round(method, &seeds, &mut rand::rng());

        // Commit.
        for (participant_id, rating) in &seeded {
            if let Some(participant) = self.store.participant_mut(*participant_id) {
                participant.initial_rating = *rating;
            }
        }
        let first_round = self.commit_rounds(id, total_rounds)?;
        self.commit_pairings(id, first_round, &pairings);
        let now = Utc::now();
        if let Some(tournament) = self.store.tournament_mut(id) {
            tournament.state = TournamentState::Active;
            tournament.current_round = 1;
            tournament.total_rounds = total_rounds;
            tournament.started_at = Some(now);
        }
        info!(
            "tournament {id} started: {} players, {total_rounds} rounds, {method} seeding",
            seeds.len()
        );
        Ok(total_rounds)
    }

    /// Create all round records for a starting tournament and return the id
    /// of round one.
    fn commit_rounds(&mut self, tournament: TournamentId, total: u32) -> TournamentResult<RoundId> {
        let mut first = None;
        for number in 1..=total {
            let round_id = self.store.alloc_id();
            self.store.insert_round(Round {
                id: round_id,
                tournament,
                number,
                bye: None,
            });
            if number == 1 {
                first = Some(round_id);
            }
        }
        first.ok_or_else(|| {
            TournamentError::InconsistentStore("planner produced zero rounds".into())
        })
    }

    /// Write one round's pairings into the store: games, the bye marker and
    /// the bye point.
    fn commit_pairings(
        &mut self,
        tournament: TournamentId,
        round: RoundId,
        pairings: &RoundPairings,
    ) {
        for &(white, black) in &pairings.boards {
            let game_id = self.store.alloc_id();
            self.store.insert_game(Game {
                id: game_id,
                tournament,
                round,
                white,
                black,
                outcome: None,
            });
        }
        if let Some(round_record) = self.store.round_mut(round) {
            round_record.bye = pairings.bye;
        }
        if let Some(bye) = pairings.bye
            && let Some(participant) = self.store.participant_mut(bye)
        {
            participant.score += Score::WIN;
            participant.had_bye = true;
        }
    }

    /// Move a tournament forward one step.
    ///
    /// While rounds remain this generates the next round's Swiss pairings
    /// from current standings. At the last round it finishes the
    /// tournament instead: placements are resolved and persisted, then
    /// every player's rating is recomputed from pre-tournament values and
    /// the whole batch applied at once. `Finished` is terminal.
    pub fn advance_round(&mut self, id: TournamentId) -> TournamentResult<RoundAdvance> {
        let started = Instant::now();
        let result = self.advance_round_inner(id);
        self.emit("advance_round", started.elapsed());
        result
    }

    fn advance_round_inner(&mut self, id: TournamentId) -> TournamentResult<RoundAdvance> {
        let tournament = self.tournament(id)?;
        if tournament.state != TournamentState::Active {
            return Err(TournamentError::InvalidTransition {
                expected: TournamentState::Active,
                actual: tournament.state,
            });
        }
        let current = tournament.current_round;
        let total = tournament.total_rounds;

        if let Some(round) = self.store.round_by_number(id, current) {
            let undecided = self
                .store
                .games_of_round(round.id)
                .iter()
                .filter(|g| g.outcome.is_none())
                .count();
            if undecided > 0 {
                warn!("tournament {id}: {undecided} games of round {current} are still undecided");
            }
        }

        if current < total {
            self.generate_next_round(id, current + 1)
        } else {
            self.finish_tournament(id)
        }
    }

    fn generate_next_round(&mut self, id: TournamentId, next: u32) -> TournamentResult<RoundAdvance> {
        let participants = self.store.participants_of(id);
        let mut seeded: Vec<(ParticipantId, Rating)> = participants
            .iter()
            .map(|p| (p.id, p.initial_rating))
            .collect();
        seeded.sort_by(|(id_a, rating_a), (id_b, rating_b)| {
            rating_b.cmp(rating_a).then(id_a.cmp(id_b))
        });
        let seeds: Vec<ParticipantId> = seeded.iter().map(|&(id, _)| id).collect();
        let scores: BTreeMap<ParticipantId, Score> =
            participants.iter().map(|p| (p.id, p.score)).collect();
        let had_bye: BTreeSet<ParticipantId> = participants
            .iter()
            .filter(|p| p.had_bye)
            .map(|p| p.id)
            .collect();
        let history = self.store.pairing_history(id);

        let pairings = pairing::pair_round(&seeds, &scores, &history, &had_bye)
            .ok_or(TournamentError::UnpairablePlayers { round: next })?;
        let round_id = self
            .store
            .round_by_number(id, next)
            .map(|r| r.id)
            .ok_or_else(|| {
                TournamentError::InconsistentStore(format!(
                    "round {next} of tournament {id} was never created"
                ))
            })?;

        // Commit.
        self.commit_pairings(id, round_id, &pairings);
        if let Some(tournament) = self.store.tournament_mut(id) {
            tournament.current_round = next;
        }
        info!(
            "tournament {id} advanced to round {next} ({} boards)",
            pairings.boards.len()
        );
        Ok(RoundAdvance::RoundGenerated(next))
    }

    fn finish_tournament(&mut self, id: TournamentId) -> TournamentResult<RoundAdvance> {
        let rating_k = self.tournament(id)?.rating_k;
        let ranked = self.resolve_placements(id);

        // Every new rating is computed from pre-tournament snapshots before
        // any player record changes, so no update can leak into another
        // participant's expectation.
        let mut new_ratings: Vec<(PlayerId, Rating)> = Vec::new();
        for participant in self.store.participants_of(id) {
            let games: Vec<(Rating, f64)> = self
                .store
                .games_of(id)
                .into_iter()
                .filter_map(|game| {
                    let outcome = game.outcome?;
                    let opponent = game.opponent_of(participant.id)?;
                    let opponent_rating = self.store.participant(opponent)?.initial_rating;
                    let actual = if game.white == participant.id {
                        outcome.white_score().points()
                    } else {
                        outcome.black_score().points()
                    };
                    Some((opponent_rating, actual))
                })
                .collect();
            new_ratings.push((
                participant.player,
                elo::updated_rating(participant.initial_rating, &games, rating_k),
            ));
        }

        // Commit.
        for (participant_id, placement) in &ranked {
            if let Some(participant) = self.store.participant_mut(*participant_id) {
                participant.final_placement = Some(*placement);
            }
        }
        for (player_id, rating) in &new_ratings {
            if let Some(player) = self.store.player_mut(*player_id) {
                player.rating = *rating;
            }
        }
        let now = Utc::now();
        if let Some(tournament) = self.store.tournament_mut(id) {
            tournament.state = TournamentState::Finished;
            tournament.finished_at = Some(now);
        }
        info!(
            "tournament {id} finished; placements set and ratings applied for {} players",
            new_ratings.len()
        );
        Ok(RoundAdvance::Finished)
    }

    /// Record a game's outcome, crediting both participants exactly once.
    pub fn record_outcome(&mut self, game_id: GameId, outcome: Outcome) -> TournamentResult<()> {
        let game = self
            .store
            .game(game_id)
            .ok_or(TournamentError::GameNotFound(game_id))?;
        let (tournament_id, round_id, white, black) =
            (game.tournament, game.round, game.white, game.black);
        if game.outcome.is_some() {
            return Err(TournamentError::GameAlreadyDecided(game_id));
        }

        let tournament = self.tournament(tournament_id)?;
        if tournament.state != TournamentState::Active {
            return Err(TournamentError::InvalidTransition {
                expected: TournamentState::Active,
                actual: tournament.state,
            });
        }
        let current = tournament.current_round;
        let round_number = self
            .store
            .round(round_id)
            .map(|r| r.number)
            .ok_or_else(|| {
                TournamentError::InconsistentStore(format!(
                    "game {game_id} references a missing round"
                ))
            })?;
        if round_number != current {
            return Err(TournamentError::StaleRound {
                round: round_number,
                current,
            });
        }

        // Commit.
        if let Some(game) = self.store.game_mut(game_id) {
            game.outcome = Some(outcome);
        }
        if let Some(participant) = self.store.participant_mut(white) {
            participant.score += outcome.white_score();
            participant.games_played += 1;
        }
        if let Some(participant) = self.store.participant_mut(black) {
            participant.score += outcome.black_score();
            participant.games_played += 1;
        }
        debug!("game {game_id} decided: {outcome}");
        Ok(())
    }

    // Queries

    fn tournament(&self, id: TournamentId) -> TournamentResult<&Tournament> {
        self.store
            .tournament(id)
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    /// Resolver-ordered placements for a tournament's participants.
    fn resolve_placements(&self, id: TournamentId) -> Vec<(ParticipantId, u32)> {
        let entries: Vec<StandingInput> = self
            .store
            .participants_of(id)
            .iter()
            .map(|p| StandingInput {
                id: p.id,
                score: p.score,
                rating: p.initial_rating,
            })
            .collect();
        let opponents: BTreeMap<ParticipantId, Vec<ParticipantId>> = entries
            .iter()
            .map(|entry| (entry.id, self.store.opponents_of(id, entry.id)))
            .collect();
        resolve(&entries, &opponents)
            .into_iter()
            .map(|ranked| (ranked.id, ranked.placement))
            .collect()
    }

    /// The standings table, best placement first.
    ///
    /// Provisional while the tournament is `Active`; authoritative and
    /// stable across repeated calls once `Finished`.
    pub fn standings(&self, id: TournamentId) -> TournamentResult<Vec<StandingsEntry>> {
        let started = Instant::now();
        let result = self.standings_inner(id);
        self.emit("standings", started.elapsed());
        result
    }

    fn standings_inner(&self, id: TournamentId) -> TournamentResult<Vec<StandingsEntry>> {
        let tournament = self.tournament(id)?;
        if tournament.state == TournamentState::NotStarted {
            return Err(TournamentError::InvalidTransition {
                expected: TournamentState::Active,
                actual: TournamentState::NotStarted,
            });
        }

        let placements: BTreeMap<ParticipantId, u32> = match tournament.state {
            // Finished placements were persisted by the resolver run at
            // finish time; read them back rather than recomputing.
            TournamentState::Finished => self
                .store
                .participants_of(id)
                .iter()
                .filter_map(|p| p.final_placement.map(|placement| (p.id, placement)))
                .collect(),
            _ => self.resolve_placements(id).into_iter().collect(),
        };

        let mut entries: Vec<StandingsEntry> = Vec::with_capacity(placements.len());
        for participant in self.store.participants_of(id) {
            let placement = placements.get(&participant.id).copied().ok_or_else(|| {
                TournamentError::InconsistentStore(format!(
                    "participant {} has no placement",
                    participant.id
                ))
            })?;
            let player = self.player(participant.player)?;
            entries.push(StandingsEntry {
                player: player.id,
                name: player.name.clone(),
                games_played: participant.games_played,
                score: participant.score,
                placement,
            });
        }
        entries.sort_by_key(|entry| entry.placement);
        Ok(entries)
    }

    /// The prize winners: the top `prize_positions` standings lines.
    pub fn winners(&self, id: TournamentId) -> TournamentResult<Vec<StandingsEntry>> {
        let prize_positions = self.tournament(id)?.prize_positions as usize;
        let mut entries = self.standings(id)?;
        entries.truncate(prize_positions);
        Ok(entries)
    }

    /// Summary counts for one tournament.
    pub fn tournament_info(&self, id: TournamentId) -> TournamentResult<TournamentInfo> {
        let tournament = self.tournament(id)?;
        Ok(self.info_of(tournament))
    }

    fn info_of(&self, tournament: &Tournament) -> TournamentInfo {
        TournamentInfo {
            id: tournament.id,
            name: tournament.name.clone(),
            prize_positions: tournament.prize_positions,
            pairing_method: tournament.pairing_method,
            state: tournament.state,
            current_round: tournament.current_round,
            total_rounds: tournament.total_rounds,
            players: self.store.participants_of(tournament.id).len(),
            created_at: tournament.created_at,
            started_at: tournament.started_at,
            finished_at: tournament.finished_at,
        }
    }

    /// List tournaments, optionally filtered by state.
    pub fn list_tournaments(&self, state_filter: Option<TournamentState>) -> Vec<TournamentInfo> {
        self.store
            .tournaments()
            .filter(|t| state_filter.is_none_or(|state| t.state == state))
            .map(|t| self.info_of(t))
            .collect()
    }

    /// A tournament summary plus one line per generated round.
    pub fn tournament_details(&self, id: TournamentId) -> TournamentResult<TournamentDetails> {
        let tournament = self.tournament(id)?;
        let info = self.info_of(tournament);

        let mut rounds = Vec::new();
        for round in self.store.rounds_of(id) {
            if round.number > tournament.current_round {
                continue;
            }
            let games = self.store.games_of_round(round.id);
            let bye = round
                .bye
                .and_then(|participant| self.participant_name(participant));
            rounds.push(RoundSummary {
                number: round.number,
                games: games.len(),
                games_decided: games.iter().filter(|g| g.outcome.is_some()).count(),
                bye,
            });
        }
        Ok(TournamentDetails { info, rounds })
    }

    /// The current round's games with names resolved, so a caller can
    /// display boards and record outcomes.
    pub fn current_round_games(&self, id: TournamentId) -> TournamentResult<Vec<GameView>> {
        let tournament = self.tournament(id)?;
        if tournament.state == TournamentState::NotStarted {
            return Err(TournamentError::InvalidTransition {
                expected: TournamentState::Active,
                actual: TournamentState::NotStarted,
            });
        }
        let number = tournament.current_round;
        let round = self.store.round_by_number(id, number).ok_or_else(|| {
            TournamentError::InconsistentStore(format!(
                "round {number} of tournament {id} was never created"
            ))
        })?;
        let games = self
            .store
            .games_of_round(round.id)
            .into_iter()
            .map(|game| GameView {
                id: game.id,
                round: number,
                white: self.participant_name(game.white).unwrap_or_default(),
                black: self.participant_name(game.black).unwrap_or_default(),
                outcome: game.outcome,
            })
            .collect();
        Ok(games)
    }

    fn participant_name(&self, id: ParticipantId) -> Option<String> {
        let participant = self.store.participant(id)?;
        let player = self.store.player(participant.player)?;
        Some(player.name.clone())
    }
}

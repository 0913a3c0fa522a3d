//! The entity arena backing the tournament engine.
//!
//! Every relation in the tournament graph (tournament -> rounds -> games ->
//! participants -> players) is expressed as an id lookup through this store,
//! never as an owning reference, so the cyclic shape of the domain never
//! turns into a Rust ownership cycle. The store is plain serde-able data:
//! the caller owns persistence by snapshotting and restoring it between
//! calls.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::models::{
    Game, GameId, Participant, ParticipantId, Player, PlayerId, Round, RoundId, Tournament,
    TournamentId,
};

/// Id-indexed entity arena.
///
/// `BTreeMap` keeps every iteration order deterministic, which the pairing
/// and standings code relies on for reproducible output.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TournamentStore {
    players: BTreeMap<PlayerId, Player>,
    tournaments: BTreeMap<TournamentId, Tournament>,
    participants: BTreeMap<ParticipantId, Participant>,
    rounds: BTreeMap<RoundId, Round>,
    games: BTreeMap<GameId, Game>,
    next_id: u64,
}

impl TournamentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next tournament-scoped entity id.
    pub fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // Players

    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    // Tournaments

    pub fn insert_tournament(&mut self, tournament: Tournament) {
        self.tournaments.insert(tournament.id, tournament);
    }

    pub fn tournament(&self, id: TournamentId) -> Option<&Tournament> {
        self.tournaments.get(&id)
    }

    pub fn tournament_mut(&mut self, id: TournamentId) -> Option<&mut Tournament> {
        self.tournaments.get_mut(&id)
    }

    pub fn tournaments(&self) -> impl Iterator<Item = &Tournament> {
        self.tournaments.values()
    }

    // Participants

    pub fn insert_participant(&mut self, participant: Participant) {
        self.participants.insert(participant.id, participant);
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.get_mut(&id)
    }

    /// All participants of a tournament, in registration (id) order.
    pub fn participants_of(&self, tournament: TournamentId) -> Vec<&Participant> {
        self.participants
            .values()
            .filter(|p| p.tournament == tournament)
            .collect()
    }

    /// The tournament's participant entry for a player, if registered.
    pub fn participant_by_player(
        &self,
        tournament: TournamentId,
        player: PlayerId,
    ) -> Option<&Participant> {
        self.participants
            .values()
            .find(|p| p.tournament == tournament && p.player == player)
    }

    // Rounds

    pub fn insert_round(&mut self, round: Round) {
        self.rounds.insert(round.id, round);
    }

    pub fn round(&self, id: RoundId) -> Option<&Round> {
        self.rounds.get(&id)
    }

    pub fn round_mut(&mut self, id: RoundId) -> Option<&mut Round> {
        self.rounds.get_mut(&id)
    }

    /// All rounds of a tournament, ordered by round number.
    pub fn rounds_of(&self, tournament: TournamentId) -> Vec<&Round> {
        let mut rounds: Vec<&Round> = self
            .rounds
            .values()
            .filter(|r| r.tournament == tournament)
            .collect();
        rounds.sort_by_key(|r| r.number);
        rounds
    }

    pub fn round_by_number(&self, tournament: TournamentId, number: u32) -> Option<&Round> {
        self.rounds
            .values()
            .find(|r| r.tournament == tournament && r.number == number)
    }

    // Games

    pub fn insert_game(&mut self, game: Game) {
        self.games.insert(game.id, game);
    }

    pub fn game(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn game_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.games.get_mut(&id)
    }

    /// All games of one round, in creation (board) order.
    pub fn games_of_round(&self, round: RoundId) -> Vec<&Game> {
        self.games.values().filter(|g| g.round == round).collect()
    }

    /// All games of a tournament across every round.
    pub fn games_of(&self, tournament: TournamentId) -> Vec<&Game> {
        self.games
            .values()
            .filter(|g| g.tournament == tournament)
            .collect()
    }

    /// Every opponent a participant has been paired against, in round order.
    ///
    /// Byes do not appear here; they have no opponent.
    pub fn opponents_of(&self, tournament: TournamentId, participant: ParticipantId) -> Vec<ParticipantId> {
        self.games_of(tournament)
            .into_iter()
            .filter_map(|g| g.opponent_of(participant))
            .collect()
    }

    /// Pairs already played in a tournament, keyed both ways, for
    /// repeat-avoidance during pairing.
    pub fn pairing_history(
        &self,
        tournament: TournamentId,
    ) -> BTreeMap<ParticipantId, BTreeSet<ParticipantId>> {
        let mut history: BTreeMap<ParticipantId, BTreeSet<ParticipantId>> = BTreeMap::new();
        for game in self.games_of(tournament) {
            history.entry(game.white).or_default().insert(game.black);
            history.entry(game.black).or_default().insert(game.white);
        }
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::models::{
        PairingMethod, Score, TournamentState,
    };
    use chrono::Utc;

    fn store_with_tournament() -> (TournamentStore, TournamentId) {
        let mut store = TournamentStore::new();
        let id = store.alloc_id();
        store.insert_tournament(Tournament {
            id,
            name: "Test".into(),
            prize_positions: 1,
            pairing_method: PairingMethod::Massacre,
            state: TournamentState::NotStarted,
            current_round: 0,
            total_rounds: 0,
            rating_k: 32.0,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        });
        (store, id)
    }

    fn add_participant(store: &mut TournamentStore, tournament: TournamentId) -> ParticipantId {
        let id = store.alloc_id();
        store.insert_participant(Participant {
            id,
            tournament,
            player: PlayerId::new_v4(),
            initial_rating: 1500,
            score: Score::ZERO,
            games_played: 0,
            had_bye: false,
            final_placement: None,
        });
        id
    }

    #[test]
    fn ids_are_unique_and_monotone() {
        let mut store = TournamentStore::new();
        let first = store.alloc_id();
        let second = store.alloc_id();
        assert!(second > first);
    }

    #[test]
    fn participants_filtered_by_tournament() {
        let (mut store, tournament) = store_with_tournament();
        let other = store.alloc_id();
        store.insert_tournament(Tournament {
            id: other,
            name: "Other".into(),
            prize_positions: 1,
            pairing_method: PairingMethod::Massacre,
            state: TournamentState::NotStarted,
            current_round: 0,
            total_rounds: 0,
            rating_k: 32.0,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        });

        let a = add_participant(&mut store, tournament);
        let b = add_participant(&mut store, tournament);
        add_participant(&mut store, other);

        let ids: Vec<ParticipantId> = store
            .participants_of(tournament)
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn pairing_history_is_symmetric() {
        let (mut store, tournament) = store_with_tournament();
        let a = add_participant(&mut store, tournament);
        let b = add_participant(&mut store, tournament);
        let round = store.alloc_id();
        store.insert_round(Round {
            id: round,
            tournament,
            number: 1,
            bye: None,
        });
        let game = store.alloc_id();
        store.insert_game(Game {
            id: game,
            tournament,
            round,
            white: a,
            black: b,
            outcome: None,
        });

        let history = store.pairing_history(tournament);
        assert!(history[&a].contains(&b));
        assert!(history[&b].contains(&a));
        assert_eq!(store.opponents_of(tournament, a), vec![b]);
    }

    #[test]
    fn snapshot_round_trips_through_serde() {
        let (mut store, tournament) = store_with_tournament();
        add_participant(&mut store, tournament);

        let snapshot = serde_json::to_string(&store).expect("store should serialize");
        let restored: TournamentStore =
            serde_json::from_str(&snapshot).expect("store should deserialize");
        assert_eq!(restored.participants_of(tournament).len(), 1);
        assert_eq!(
            restored.tournament(tournament).map(|t| t.name.as_str()),
            Some("Test")
        );
    }
}
